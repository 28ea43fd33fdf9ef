//! HTTP adapter for webhook intake.
//!
//! Exposes the fulfillment pipeline's inbound surface:
//! - `POST /webhooks/omise` - Handle Omise webhook deliveries
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::WebhookAppState;
pub use routes::webhook_router;
