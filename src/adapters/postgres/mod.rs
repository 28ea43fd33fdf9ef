//! PostgreSQL adapters - Database implementations for store ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresWebhookRecordStore` - Inbound delivery audit log
//! - `PostgresOrderStore` - Order aggregates keyed by charge id
//! - `PostgresLineItemStore` - Line items keyed by (order, course, email)

mod line_item_repository;
mod order_repository;
mod webhook_record_repository;

pub use line_item_repository::PostgresLineItemStore;
pub use order_repository::PostgresOrderStore;
pub use webhook_record_repository::PostgresWebhookRecordStore;
