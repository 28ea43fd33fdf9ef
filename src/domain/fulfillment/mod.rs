//! Fulfillment domain module.
//!
//! Handles verified payment events, order aggregation, and the
//! exactly-once provisioning pipeline behind course purchases.
//!
//! # Module Structure
//!
//! - `status` - FulfillmentStatus state machine shared by orders and items
//! - `webhook_record` - Audit record of every inbound delivery
//! - `omise_event` - Provider event and charge wire types
//! - `order` - Order aggregate entity
//! - `line_item` - LineItem aggregate entity
//! - `credentials` - Initial password generation
//! - `errors` - Intake and fulfillment error taxonomy
//! - `orchestrator` - Status-guarded fulfillment driver

mod credentials;
mod errors;
mod line_item;
mod omise_event;
mod order;
mod orchestrator;
mod status;
mod webhook_record;

pub use credentials::{generate_password, DEFAULT_PASSWORD_LENGTH};
pub use errors::{AdapterError, FulfillmentError, VerificationError, WebhookError};
pub use line_item::LineItem;
pub use omise_event::{
    Card, Charge, ChargeLineItem, ChargeMetadata, ChargeStatus, LineItemMetadata, OmiseEvent,
    OmiseEventData, OmiseEventType,
};
pub use order::Order;
pub use orchestrator::{
    FulfillmentOrchestrator, FulfillmentOutcome, ItemFailurePolicy,
};
pub use status::FulfillmentStatus;
pub use webhook_record::{RecordStatus, WebhookRecord};

#[cfg(test)]
pub use omise_event::OmiseEventBuilder;
