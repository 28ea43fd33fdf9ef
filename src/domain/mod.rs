//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `fulfillment` - Verified payment events and the enrollment pipeline

pub mod foundation;
pub mod fulfillment;
