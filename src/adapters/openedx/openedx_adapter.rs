//! Open edX LMS adapter.
//!
//! Implements the `IdentityProvider` and `EnrollmentProvider` traits
//! against an Open edX instance's REST API. Account lookup and
//! registration go through the user API; enrollment goes through the
//! enrollment API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenEdxConfig::new("https://lms.example.com", api_token);
//! let adapter = OpenEdxAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::CourseId;
use crate::domain::fulfillment::AdapterError;
use crate::ports::{EnrollmentProvider, IdentityProvider};

/// Open edX API configuration.
#[derive(Clone)]
pub struct OpenEdxConfig {
    /// Base URL of the LMS (no trailing slash).
    base_url: String,

    /// API token with account and enrollment permissions.
    api_token: SecretString,
}

impl OpenEdxConfig {
    /// Create a new Open edX configuration.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: SecretString::new(api_token.into()),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `OPENEDX_BASE_URL`
    /// - `OPENEDX_API_TOKEN`
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let base_url = std::env::var("OPENEDX_BASE_URL")?;
        let api_token = std::env::var("OPENEDX_API_TOKEN")?;

        Ok(Self {
            base_url,
            api_token: SecretString::new(api_token),
        })
    }
}

/// Open edX LMS adapter.
///
/// Implements `IdentityProvider` and `EnrollmentProvider` for a single
/// LMS instance.
pub struct OpenEdxAdapter {
    config: OpenEdxConfig,
    http_client: reqwest::Client,
}

impl OpenEdxAdapter {
    /// Create a new Open edX adapter with the given configuration.
    pub fn new(config: OpenEdxConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Derive the LMS username for an email address.
    ///
    /// The registration API requires a username alongside the email.
    /// Accounts are provisioned with this derivation, so enrollment can
    /// reconstruct the username from the email alone.
    fn username_for(email: &str) -> String {
        let local = email.split('@').next().unwrap_or(email);
        local
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }

    /// Classify an unsuccessful LMS response.
    ///
    /// Server errors are transient and retryable; everything else is an
    /// authoritative refusal.
    fn classify(service: &'static str, status: reqwest::StatusCode, body: String) -> AdapterError {
        if status.is_server_error() {
            AdapterError::transport(service, format!("{}: {}", status, body))
        } else {
            AdapterError::rejected(service, format!("{}: {}", status, body))
        }
    }
}

#[async_trait]
impl IdentityProvider for OpenEdxAdapter {
    async fn exists(&self, email: &str) -> Result<bool, AdapterError> {
        let url = format!("{}/api/user/v1/accounts", self.config.base_url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.config.api_token.expose_secret())
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| AdapterError::transport("identity", e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "Account lookup failed");
            return Err(Self::classify("identity", status, error_text));
        }

        let accounts: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| AdapterError::transport("identity", format!("unreadable response: {}", e)))?;

        Ok(!accounts.is_empty())
    }

    async fn create(&self, email: &str, password: &str) -> Result<(), AdapterError> {
        let url = format!(
            "{}/api/user/v1/account/registration/",
            self.config.base_url
        );
        let username = Self::username_for(email);

        let params = [
            ("email", email),
            ("username", username.as_str()),
            ("name", username.as_str()),
            ("password", password),
            ("honor_code", "true"),
            ("terms_of_service", "true"),
        ];

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_token.expose_secret())
            .form(&params)
            .send()
            .await
            .map_err(|e| AdapterError::transport("identity", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                email = %email,
                status = %status,
                error = %error_text,
                "Account registration failed"
            );
            return Err(Self::classify("identity", status, error_text));
        }

        tracing::info!(email = %email, username = %username, "LMS account created");

        Ok(())
    }
}

#[async_trait]
impl EnrollmentProvider for OpenEdxAdapter {
    async fn enroll(&self, course_id: &CourseId, email: &str) -> Result<(), AdapterError> {
        let url = format!("{}/api/enrollment/v1/enrollment", self.config.base_url);
        let username = Self::username_for(email);

        let body = serde_json::json!({
            "user": username,
            "mode": "honor",
            "course_details": { "course_id": course_id.as_str() },
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AdapterError::transport("enrollment", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                course_id = %course_id,
                email = %email,
                status = %status,
                error = %error_text,
                "Enrollment request failed"
            );
            return Err(Self::classify("enrollment", status, error_text));
        }

        tracing::info!(course_id = %course_id, email = %email, "Learner enrolled");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ════════════════════════════════════════════════════════════════════════════
    // Username Derivation Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn username_uses_local_part_of_email() {
        assert_eq!(OpenEdxAdapter::username_for("learner@example.com"), "learner");
    }

    #[test]
    fn username_replaces_non_alphanumerics() {
        assert_eq!(
            OpenEdxAdapter::username_for("first.last+tag@example.com"),
            "first_last_tag"
        );
    }

    #[test]
    fn username_is_stable_across_calls() {
        let a = OpenEdxAdapter::username_for("a.b@x.com");
        let b = OpenEdxAdapter::username_for("a.b@x.com");
        assert_eq!(a, b);
    }

    #[test]
    fn username_without_at_sign_uses_whole_string() {
        assert_eq!(OpenEdxAdapter::username_for("not-an-email"), "not_an_email");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Response Classification Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn server_errors_classify_as_transport() {
        let err = OpenEdxAdapter::classify(
            "enrollment",
            reqwest::StatusCode::BAD_GATEWAY,
            "upstream down".to_string(),
        );
        assert!(err.is_transport());
    }

    #[test]
    fn client_errors_classify_as_rejected() {
        let err = OpenEdxAdapter::classify(
            "identity",
            reqwest::StatusCode::CONFLICT,
            "already registered".to_string(),
        );
        assert!(!err.is_transport());
        assert!(matches!(err, AdapterError::Rejected { service, .. } if service == "identity"));
    }
}
