//! OrderStore port - Interface for the order aggregate.
//!
//! ## Why Get-or-Create Matters
//!
//! The provider may deliver the same webhook multiple times, including
//! concurrently. Creation is therefore a single conditional write keyed
//! by charge id: the first writer wins and every later caller gets the
//! winner's row back. No locking, no read-then-insert races.

use async_trait::async_trait;

use crate::domain::foundation::{ChargeId, DomainError};
use crate::domain::fulfillment::Order;

/// Result of an idempotent create attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome<T> {
    /// The candidate row was inserted (first delivery).
    Created(T),
    /// A row already existed under the key; the candidate was discarded.
    Existing(T),
}

impl<T> CreateOutcome<T> {
    /// Returns true if this caller inserted the row.
    pub fn was_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }

    /// Unwraps the stored aggregate, created or not.
    pub fn into_inner(self) -> T {
        match self {
            CreateOutcome::Created(value) | CreateOutcome::Existing(value) => value,
        }
    }

    /// Borrows the stored aggregate, created or not.
    pub fn get(&self) -> &T {
        match self {
            CreateOutcome::Created(value) | CreateOutcome::Existing(value) => value,
        }
    }
}

/// Port for persisting orders.
///
/// Implementations enforce the one-order-per-charge invariant with a
/// primary key on the charge id and insert-if-absent semantics.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts the candidate order unless one already exists for its
    /// charge id, in which case the existing row is returned untouched.
    async fn get_or_create(&self, candidate: Order) -> Result<CreateOutcome<Order>, DomainError>;

    /// Loads an order by charge id.
    async fn find(&self, charge_id: &ChargeId) -> Result<Option<Order>, DomainError>;

    /// Persists the current state of an existing order.
    async fn update(&self, order: &Order) -> Result<(), DomainError>;
}
