//! Line item aggregate entity.
//!
//! One line item per (order, course, recipient email) triple. That triple
//! is the idempotency key: re-running fulfillment for the same purchase
//! finds the existing item instead of provisioning twice.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ChargeId, CourseId, DomainError, ErrorCode, LineItemId, StateMachine, Timestamp,
};

use super::FulfillmentStatus;

/// Line item aggregate - one course enrollment for one recipient.
///
/// # Invariants
///
/// - `(order_id, course_id, email)` is unique across all line items
/// - Status transitions follow state machine rules
/// - A `Processed` item is never fulfilled again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique line item identifier.
    pub id: LineItemId,

    /// The owning order, by charge id.
    pub order_id: ChargeId,

    /// Course to enroll the recipient into.
    pub course_id: CourseId,

    /// Recipient email for this item.
    pub email: String,

    /// Provider SKU string, when the charge carried one.
    pub sku: Option<String>,

    /// Current fulfillment status.
    pub status: FulfillmentStatus,

    /// When the item was first recorded.
    pub created_at: Timestamp,

    /// When the item was last updated.
    pub updated_at: Timestamp,
}

impl LineItem {
    /// Creates a new line item in `New` status.
    pub fn new(order_id: ChargeId, course_id: CourseId, email: String, sku: Option<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id: LineItemId::new(),
            order_id,
            course_id,
            email,
            sku,
            status: FulfillmentStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    /// Begins fulfillment of this item.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn start_processing(&mut self) -> Result<(), DomainError> {
        self.transition_to(FulfillmentStatus::Processing)
    }

    /// Marks this item as fulfilled.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn finish_processing(&mut self) -> Result<(), DomainError> {
        self.transition_to(FulfillmentStatus::Processed)
    }

    /// Marks this item as failed.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn fail(&mut self) -> Result<(), DomainError> {
        self.transition_to(FulfillmentStatus::Error)
    }

    /// Returns true if no further business mutation is permitted.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Transition to a new status using the state machine.
    fn transition_to(&mut self, target: FulfillmentStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition line item from {:?} to {:?}",
                    self.status, target
                ),
            )
            .with_detail("line_item_id", self.id.to_string())
        })?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
