//! Background task adapters.
//!
//! Implements the `FulfillmentScheduler` port with a Tokio-spawned
//! runner that drives the orchestrator through bounded retries.

mod fulfillment_runner;

pub use fulfillment_runner::{FulfillmentRunnerConfig, TaskError, TokioFulfillmentRunner};
