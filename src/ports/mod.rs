//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Provider Ports
//!
//! - `EventVerifier` - Authenticated event re-fetch against the payment API
//!
//! ## Store Ports
//!
//! - `WebhookRecordStore` - Audit log of every inbound delivery
//! - `OrderStore` - Idempotent order persistence keyed by charge id
//! - `LineItemStore` - Idempotent item persistence keyed by (order, course, email)
//!
//! ## Fulfillment Ports
//!
//! - `IdentityProvider` - LMS account lookup and provisioning
//! - `EnrollmentProvider` - Course enrollment
//! - `WelcomeNotifier` - Credential delivery to new learners
//! - `FulfillmentScheduler` - Async dispatch of fulfillment runs

mod enrollment_provider;
mod event_verifier;
mod fulfillment_scheduler;
mod identity_provider;
mod line_item_store;
mod notifier;
mod order_store;
mod webhook_record_store;

pub use enrollment_provider::EnrollmentProvider;
pub use event_verifier::EventVerifier;
pub use fulfillment_scheduler::FulfillmentScheduler;
pub use identity_provider::IdentityProvider;
pub use line_item_store::LineItemStore;
pub use notifier::WelcomeNotifier;
pub use order_store::{CreateOutcome, OrderStore};
pub use webhook_record_store::WebhookRecordStore;
