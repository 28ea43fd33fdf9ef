//! Webhook record entity and its lifecycle.
//!
//! Every inbound delivery produces exactly one record, whether or not the
//! payload turns out to be usable. The record is an audit artifact for the
//! ingestion path only; business logic never inspects it beyond existence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, StateMachine, Timestamp, WebhookRecordId,
};

/// Ingestion status of a webhook record.
///
/// Transitions are monotonic: a record never regresses, and Done/Failed
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Payload stored, nothing inspected yet.
    Received,

    /// The ingestion path is working on this delivery.
    Processing,

    /// Ingestion completed. Terminal.
    Done,

    /// Ingestion rejected the delivery. Terminal.
    Failed,
}

impl StateMachine for RecordStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RecordStatus::*;
        matches!(
            (self, target),
            (Received, Processing) | (Received, Failed) | (Processing, Done) | (Processing, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RecordStatus::*;
        match self {
            Received => vec![Processing, Failed],
            Processing => vec![Done, Failed],
            Done => vec![],
            Failed => vec![],
        }
    }
}

/// Raw inbound webhook delivery.
///
/// # Invariants
///
/// - `payload` and `headers` are immutable once the record is created
/// - Status transitions follow the [`RecordStatus`] state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookRecord {
    /// Unique identifier for this record.
    pub id: WebhookRecordId,

    /// Raw request body as received.
    pub payload: String,

    /// Request headers as received.
    pub headers: HashMap<String, String>,

    /// Current ingestion status.
    pub status: RecordStatus,

    /// When the delivery arrived.
    pub received_at: Timestamp,

    /// When the record was last updated.
    pub updated_at: Timestamp,
}

impl WebhookRecord {
    /// Creates a record for a freshly received delivery.
    pub fn receive(payload: impl Into<String>, headers: HashMap<String, String>) -> Self {
        let now = Timestamp::now();
        Self {
            id: WebhookRecordId::new(),
            payload: payload.into(),
            headers,
            status: RecordStatus::Received,
            received_at: now,
            updated_at: now,
        }
    }

    /// Marks the record as being worked on.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn mark_processing(&mut self) -> Result<(), DomainError> {
        self.transition_to(RecordStatus::Processing)
    }

    /// Marks ingestion of this delivery as complete.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn mark_done(&mut self) -> Result<(), DomainError> {
        self.transition_to(RecordStatus::Done)
    }

    /// Marks the delivery as rejected.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn mark_failed(&mut self) -> Result<(), DomainError> {
        self.transition_to(RecordStatus::Failed)
    }

    /// Transition to a new status using the state machine.
    fn transition_to(&mut self, target: RecordStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition webhook record from {:?} to {:?}",
                    self.status, target
                ),
            )
            .with_detail("record_id", self.id.to_string())
        })?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
