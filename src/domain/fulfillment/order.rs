//! Order aggregate entity.
//!
//! One Order per provider charge. The charge ID is the natural key, so
//! duplicate webhook deliveries converge on the same row via idempotent
//! get-or-create rather than locking.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ChargeId, DomainError, ErrorCode, StateMachine, Timestamp, ValidationError, WebhookRecordId,
};

use super::{Charge, FulfillmentStatus};

/// Order aggregate - one paid (or failed) charge and its fulfillment state.
///
/// # Invariants
///
/// - `charge_id` is unique (at most one Order per charge)
/// - Status transitions follow state machine rules
/// - `webhook_id` is a back-reference only; an order may outlive or
///   predate its originating record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Provider-assigned charge identifier. External, never generated here.
    pub charge_id: ChargeId,

    /// Purchaser email from the charge metadata.
    pub email: String,

    /// Purchaser first name from the cardholder name.
    pub first_name: String,

    /// Purchaser last name from the cardholder name.
    pub last_name: String,

    /// Current fulfillment status.
    pub status: FulfillmentStatus,

    /// The webhook record that created this order, when known.
    pub webhook_id: Option<WebhookRecordId>,

    /// When the order was first recorded.
    pub received_at: Timestamp,

    /// When the order was last updated.
    pub updated_at: Timestamp,
}

impl Order {
    /// Builds the order candidate for a verified charge.
    ///
    /// Field defaults mirror what the provider gives us: email from the
    /// charge metadata (empty when absent), first/last name from the
    /// cardholder name split on the first space. A charge that is not
    /// `successful` produces an order already in `Error`, which records
    /// the failed payment without ever scheduling fulfillment for it.
    ///
    /// # Errors
    ///
    /// Returns error if the charge carries an empty id.
    pub fn from_charge(
        charge: &Charge,
        webhook_id: Option<WebhookRecordId>,
    ) -> Result<Self, ValidationError> {
        let charge_id = ChargeId::new(charge.id.clone())?;

        let email = charge.metadata.email.clone().unwrap_or_default();
        let card_name = charge
            .card
            .as_ref()
            .and_then(|card| card.name.as_deref())
            .unwrap_or("");
        let (first_name, last_name) = match card_name.split_once(' ') {
            Some((first, rest)) => (first.to_string(), rest.to_string()),
            None => (card_name.to_string(), String::new()),
        };

        let status = if charge.status.is_successful() {
            FulfillmentStatus::New
        } else {
            FulfillmentStatus::Error
        };

        let now = Timestamp::now();
        Ok(Self {
            charge_id,
            email,
            first_name,
            last_name,
            status,
            webhook_id,
            received_at: now,
            updated_at: now,
        })
    }

    /// Begins a fulfillment run on this order.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn start_processing(&mut self) -> Result<(), DomainError> {
        self.transition_to(FulfillmentStatus::Processing)
    }

    /// Marks fulfillment of this order as complete.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn finish_processing(&mut self) -> Result<(), DomainError> {
        self.transition_to(FulfillmentStatus::Processed)
    }

    /// Marks this order as failed.
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
                    "Cannot transition order from {:?} to {:?}",
                    self.status, target
                ),
            )
            .with_detail("charge_id", self.charge_id.to_string())
        })?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
