//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod fulfillment;

pub use fulfillment::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
