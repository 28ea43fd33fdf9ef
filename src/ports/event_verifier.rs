//! EventVerifier port - Interface for authenticating webhook events.
//!
//! Inbound webhook payloads are untrusted. The only field ever taken from
//! them is the event id; everything else comes from re-fetching the event
//! against the provider's authenticated API through this port.

use async_trait::async_trait;

use crate::domain::foundation::EventId;
use crate::domain::fulfillment::{OmiseEvent, VerificationError};

/// Port for re-fetching an event from the payment provider.
///
/// Implementations must:
/// - Authenticate the lookup with provider credentials
/// - Return the provider's own representation, never the inbound payload
/// - Surface an id mismatch between request and response as an error
#[async_trait]
pub trait EventVerifier: Send + Sync {
    /// Fetches the event with the given id from the provider.
    ///
    /// # Errors
    ///
    /// - `VerificationError::Transport` - provider unreachable or 5xx
    /// - `VerificationError::InvalidResponse` - body did not decode
    /// - `VerificationError::NotFound` - provider has no such event
    /// - `VerificationError::Mismatch` - fetched id differs from requested
    async fn verify(&self, event_id: &EventId) -> Result<OmiseEvent, VerificationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventVerifier) {}
}
