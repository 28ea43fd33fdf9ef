//! In-memory store adapters for testing.
//!
//! Deterministic, process-local implementations of the persistence
//! ports. Used by unit and integration tests; production deployments
//! use the Postgres adapters.

mod stores;

pub use stores::{InMemoryLineItemStore, InMemoryOrderStore, InMemoryWebhookRecordStore};
