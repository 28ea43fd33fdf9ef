//! IdentityProvider port - Interface for learner account management.
//!
//! The fulfillment pipeline provisions LMS accounts for purchasers that
//! do not have one yet. This port abstracts the LMS user API.

use async_trait::async_trait;

use crate::domain::fulfillment::AdapterError;

/// Port for looking up and creating learner accounts.
///
/// Both operations must be safe to repeat: fulfillment retries may call
/// `exists` for the same email several times, and `create` is only ever
/// issued after a negative lookup.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns true if an account exists for the given email.
    async fn exists(&self, email: &str) -> Result<bool, AdapterError>;

    /// Creates an account with the given email and initial password.
    async fn create(&self, email: &str, password: &str) -> Result<(), AdapterError>;
}
