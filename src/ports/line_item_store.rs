//! LineItemStore port - Interface for the line item aggregate.
//!
//! Same insert-if-absent discipline as the order store, keyed by the
//! `(order_id, course_id, email)` triple instead of a single id.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::fulfillment::LineItem;

use super::order_store::CreateOutcome;

/// Port for persisting line items.
#[async_trait]
pub trait LineItemStore: Send + Sync {
    /// Inserts the candidate item unless one already exists for its
    /// `(order_id, course_id, email)` key, in which case the existing
    /// row is returned untouched.
    async fn get_or_create(
        &self,
        candidate: LineItem,
    ) -> Result<CreateOutcome<LineItem>, DomainError>;

    /// Persists the current state of an existing item.
    async fn update(&self, item: &LineItem) -> Result<(), DomainError>;
}
