//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Omise)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Omise secret key, used as the basic auth username for event lookups
    pub omise_secret_key: String,

    /// Omise API base URL
    #[serde(default = "default_api_base_url")]
    pub omise_api_base_url: String,
}

impl PaymentConfig {
    /// Check if using Omise test mode
    pub fn is_test_mode(&self) -> bool {
        self.omise_secret_key.starts_with("skey_test_")
    }

    /// Check if using Omise live mode
    pub fn is_live_mode(&self) -> bool {
        self.omise_secret_key.starts_with("skey_") && !self.is_test_mode()
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.omise_secret_key.is_empty() {
            return Err(ValidationError::MissingRequired("OMISE_SECRET_KEY"));
        }

        // Verify key prefix for safety
        if !self.omise_secret_key.starts_with("skey_") {
            return Err(ValidationError::InvalidOmiseKey);
        }

        if !self.omise_api_base_url.starts_with("http://")
            && !self.omise_api_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidBaseUrl);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            omise_secret_key: String::new(),
            omise_api_base_url: default_api_base_url(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.omise.co".to_string()
}
