//! Omise payment provider adapter.
//!
//! Implements the `EventVerifier` trait against the Omise events API.
//! Inbound webhook payloads are untrusted; the adapter re-fetches the
//! event by id over the authenticated API and hands back the provider's
//! own representation.
//!
//! # Security
//!
//! - Authenticates with the secret key as HTTP basic auth username
//! - Secrets handled via `secrecy::SecretString`
//! - Rejects responses whose event id differs from the requested one
//!
//! # Configuration
//!
//! ```ignore
//! let config = OmiseConfig::new(secret_key);
//! let verifier = OmiseEventVerifier::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::EventId;
use crate::domain::fulfillment::{OmiseEvent, VerificationError};
use crate::ports::EventVerifier;

/// Omise API configuration.
#[derive(Clone)]
pub struct OmiseConfig {
    /// Omise secret API key (skey_... or skey_test_...).
    secret_key: SecretString,

    /// Base URL for the Omise API (default: https://api.omise.co).
    api_base_url: String,
}

impl OmiseConfig {
    /// Create a new Omise configuration.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            api_base_url: "https://api.omise.co".to_string(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `OMISE_SECRET_KEY`
    /// - `OMISE_API_BASE_URL` (optional, defaults to the public API)
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let secret_key = std::env::var("OMISE_SECRET_KEY")?;
        let api_base_url = std::env::var("OMISE_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.omise.co".to_string());

        Ok(Self {
            secret_key: SecretString::new(secret_key),
            api_base_url,
        })
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Omise event verifier adapter.
///
/// Implements `EventVerifier` by re-fetching events from the Omise API.
pub struct OmiseEventVerifier {
    config: OmiseConfig,
    http_client: reqwest::Client,
}

impl OmiseEventVerifier {
    /// Create a new Omise verifier with the given configuration.
    pub fn new(config: OmiseConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn event_url(&self, event_id: &EventId) -> String {
        format!("{}/events/{}", self.config.api_base_url, event_id)
    }
}

#[async_trait]
impl EventVerifier for OmiseEventVerifier {
    async fn verify(&self, event_id: &EventId) -> Result<OmiseEvent, VerificationError> {
        let url = self.event_url(event_id);

        // Omise authenticates with the secret key as the basic auth
        // username and an empty password.
        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.secret_key.expose_secret(), Some(""))
            .send()
            .await
            .map_err(|e| VerificationError::Transport {
                message: e.to_string(),
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!(event_id = %event_id, "Provider has no event under this id");
            return Err(VerificationError::NotFound {
                event_id: event_id.to_string(),
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                event_id = %event_id,
                status = %status,
                error = %error_text,
                "Omise event lookup failed"
            );
            return Err(VerificationError::Transport {
                message: format!("Omise API error ({}): {}", status, error_text),
            });
        }

        let event: OmiseEvent =
            response
                .json()
                .await
                .map_err(|e| VerificationError::InvalidResponse {
                    message: format!("Failed to parse Omise event: {}", e),
                })?;

        if event.id != event_id.as_str() {
            tracing::warn!(
                requested = %event_id,
                fetched = %event.id,
                "Fetched event id does not match the requested id"
            );
            return Err(VerificationError::Mismatch {
                requested: event_id.to_string(),
                fetched: event.id,
            });
        }

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Event verified against provider API"
        );

        Ok(event)
    }
}
