//! WebhookRecordStore port - Interface for the inbound delivery audit log.
//!
//! Every inbound webhook call produces exactly one record, parseable or
//! not, before any business handling starts. The records are never read
//! for business decisions; they exist for replay diagnostics.
//!
//! Status updates load the record and apply the entity's guarded
//! transitions, so a `Done` or `Failed` record can never regress no
//! matter what the caller does.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, WebhookRecordId};
use crate::domain::fulfillment::WebhookRecord;

/// Port for persisting webhook delivery records.
#[async_trait]
pub trait WebhookRecordStore: Send + Sync {
    /// Persists a freshly received record.
    async fn persist(&self, record: WebhookRecord) -> Result<(), DomainError>;

    /// Marks the record as being handled.
    ///
    /// # Errors
    ///
    /// Returns `WebhookRecordNotFound` if no record exists under the id,
    /// or `InvalidStateTransition` if the record already settled.
    async fn mark_processing(&self, id: &WebhookRecordId) -> Result<(), DomainError>;

    /// Marks the record as fully handled.
    async fn mark_done(&self, id: &WebhookRecordId) -> Result<(), DomainError>;

    /// Marks the record as rejected.
    async fn mark_failed(&self, id: &WebhookRecordId) -> Result<(), DomainError>;

    /// Loads a record by id.
    async fn find(&self, id: &WebhookRecordId) -> Result<Option<WebhookRecord>, DomainError>;
}
