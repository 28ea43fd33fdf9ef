//! WelcomeNotifier port - Interface for sending account credentials.
//!
//! Welcome mail is advisory. The orchestrator logs a send failure and
//! carries on; enrollment is the contracted outcome, not the email.

use async_trait::async_trait;

use crate::domain::fulfillment::AdapterError;

/// Port for notifying a newly provisioned learner of their credentials.
#[async_trait]
pub trait WelcomeNotifier: Send + Sync {
    /// Sends a welcome message carrying the initial password.
    async fn send_welcome(&self, email: &str, password: &str) -> Result<(), AdapterError>;
}
