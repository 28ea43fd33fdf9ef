//! Resend transactional email adapter.
//!
//! Implements the `WelcomeNotifier` trait by posting to the Resend
//! `/emails` endpoint. The welcome message carries the initial password
//! for a freshly provisioned learner account.
//!
//! # Configuration
//!
//! ```ignore
//! let config = ResendConfig::new(api_key, "Coursegate <noreply@coursegate.io>");
//! let notifier = ResendNotifier::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::fulfillment::AdapterError;
use crate::ports::WelcomeNotifier;

/// Resend API configuration.
#[derive(Clone)]
pub struct ResendConfig {
    /// Resend API key (re_...).
    api_key: SecretString,

    /// Base URL for the Resend API (default: https://api.resend.com).
    api_base_url: String,

    /// From header value, e.g. "Coursegate <noreply@coursegate.io>".
    from: String,

    /// Login page the welcome message points the learner at.
    login_url: String,

    /// Platform name used in the subject and signature.
    platform_name: String,
}

impl ResendConfig {
    /// Create a new Resend configuration.
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.resend.com".to_string(),
            from: from.into(),
            login_url: "https://learn.coursegate.io/login".to_string(),
            platform_name: "Coursegate".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the login URL included in the welcome message.
    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    /// Set the platform name used in the subject and signature.
    pub fn with_platform_name(mut self, name: impl Into<String>) -> Self {
        self.platform_name = name.into();
        self
    }
}

/// Resend email notifier adapter.
///
/// Implements `WelcomeNotifier` for the Resend HTTP API.
pub struct ResendNotifier {
    config: ResendConfig,
    http_client: reqwest::Client,
}

impl ResendNotifier {
    /// Create a new Resend notifier with the given configuration.
    pub fn new(config: ResendConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn subject(&self) -> String {
        format!("Welcome to {}", self.config.platform_name)
    }

    fn body(&self, email: &str, password: &str) -> String {
        format!(
            "Hello,\n\n\
             Your account has been created successfully. You can now access \
             your course using the following credentials:\n\n\
             Email: {email}\n\
             Password: {password}\n\n\
             Please log in at {login_url} and change your password after \
             logging in.\n\n\
             Best regards,\n\
             The {platform} Team\n",
            email = email,
            password = password,
            login_url = self.config.login_url,
            platform = self.config.platform_name,
        )
    }
}

#[async_trait]
impl WelcomeNotifier for ResendNotifier {
    async fn send_welcome(&self, email: &str, password: &str) -> Result<(), AdapterError> {
        let url = format!("{}/emails", self.config.api_base_url);

        let payload = serde_json::json!({
            "from": self.config.from,
            "to": [email],
            "subject": self.subject(),
            "text": self.body(email, password),
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| AdapterError::transport("email", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                recipient = %email,
                status = %status,
                error = %error_text,
                "Welcome email send failed"
            );
            if status.is_server_error() {
                return Err(AdapterError::transport(
                    "email",
                    format!("{}: {}", status, error_text),
                ));
            }
            return Err(AdapterError::rejected(
                "email",
                format!("{}: {}", status, error_text),
            ));
        }

        tracing::info!(recipient = %email, "Welcome email sent");

        Ok(())
    }
}
