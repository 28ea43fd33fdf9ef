//! Fulfillment handlers.
//!
//! Command handlers for the webhook intake path:
//!
//! - Receiving and verifying payment provider webhooks
//! - Recording orders and dispatching fulfillment work

mod handle_payment_webhook;

pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
