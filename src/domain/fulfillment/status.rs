//! Fulfillment status state machine.
//!
//! Orders and line items share the same lifecycle: work moves forward
//! through New and Processing, and ends in Processed or Error. Both
//! terminal states are hard stops; nothing transitions out of them.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Processing status of an order or line item.
///
/// The terminal states are the idempotency boundary: once an aggregate
/// is Processed or Error, no further business mutation is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    /// Recorded but not yet picked up by a fulfillment run.
    New,

    /// A fulfillment run has started work. Seeing this on entry means
    /// a previous run was interrupted or is still in flight.
    Processing,

    /// All side effects completed. Terminal.
    Processed,

    /// Fulfillment failed. Terminal; replay is an operator concern.
    Error,
}

impl StateMachine for FulfillmentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use FulfillmentStatus::*;
        matches!(
            (self, target),
            // Forward progress
            (New, Processing) | (Processing, Processed)
            // Failure from any non-terminal state
                | (New, Error)
                | (Processing, Error)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use FulfillmentStatus::*;
        match self {
            New => vec![Processing, Error],
            Processing => vec![Processed, Error],
            Processed => vec![],
            Error => vec![],
        }
    }
}
