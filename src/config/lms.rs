//! LMS configuration

use serde::Deserialize;

use super::error::ValidationError;

/// LMS configuration (Open edX)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LmsConfig {
    /// Open edX base URL
    pub base_url: String,

    /// API token for the registration and enrollment endpoints
    pub api_token: String,
}

impl LmsConfig {
    /// Validate LMS configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("LMS_BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.api_token.is_empty() {
            return Err(ValidationError::MissingRequired("LMS_API_TOKEN"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_missing_base_url() {
        let config = LmsConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_base_url() {
        let config = LmsConfig {
            base_url: "learn.example.com".to_string(),
            api_token: "token".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_missing_api_token() {
        let config = LmsConfig {
            base_url: "https://learn.example.com".to_string(),
            api_token: String::new(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        let config = LmsConfig {
            base_url: "https://learn.example.com".to_string(),
            api_token: "edx-api-token".to_string(),
        };
        assert!(config.validate().is_ok());
    }
}
