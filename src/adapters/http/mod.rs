//! HTTP adapters - REST API implementations.
//!
//! The webhook intake surface is the only inbound API; fulfillment itself
//! runs in the background and exposes nothing over HTTP.

pub mod webhooks;

// Re-export key types for convenience
pub use webhooks::webhook_router;
pub use webhooks::WebhookAppState;
