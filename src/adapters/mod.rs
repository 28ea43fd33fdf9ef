//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `omise` - Event verification against the Omise API
//! - `openedx` - Account provisioning and enrollment on Open edX
//! - `email` - Welcome notifications via Resend
//! - `postgres` - Durable stores for records, orders and line items
//! - `memory` - In-memory stores for tests and local development
//! - `tasks` - Background fulfillment runner on Tokio
//! - `http` - Axum REST surface for webhook intake

pub mod email;
pub mod http;
pub mod memory;
pub mod omise;
pub mod openedx;
pub mod postgres;
pub mod tasks;

pub use email::{ResendConfig, ResendNotifier};
pub use omise::{OmiseConfig, OmiseEventVerifier};
pub use openedx::{OpenEdxAdapter, OpenEdxConfig};
pub use tasks::{FulfillmentRunnerConfig, TokioFulfillmentRunner};
