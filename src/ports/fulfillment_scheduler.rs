//! FulfillmentScheduler port - Interface for dispatching fulfillment work.
//!
//! The webhook intake path must answer the provider quickly. Fulfillment
//! runs off the request path: intake hands the verified charge to this
//! port and returns, and a worker picks it up asynchronously.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::fulfillment::Charge;

/// Port for scheduling an asynchronous fulfillment run.
#[async_trait]
pub trait FulfillmentScheduler: Send + Sync {
    /// Enqueues fulfillment for the given verified charge.
    ///
    /// Returns once the work is accepted, not once it completes. The
    /// outcome of the run is visible only through order status and logs.
    async fn schedule(&self, charge: Charge) -> Result<(), DomainError>;
}
