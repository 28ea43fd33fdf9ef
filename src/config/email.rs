//! Email configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Email configuration (Resend)
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key
    pub resend_api_key: String,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Login URL included in welcome emails
    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// Platform name for welcome email subject and signature
    #[serde(default = "default_platform_name")]
    pub platform_name: String,
}

impl EmailConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.resend_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("RESEND_API_KEY"));
        }
        if !self.resend_api_key.starts_with("re_") {
            return Err(ValidationError::InvalidResendKey);
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        if !self.login_url.starts_with("http://") && !self.login_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            login_url: default_login_url(),
            platform_name: default_platform_name(),
        }
    }
}

fn default_from_email() -> String {
    "noreply@coursegate.io".to_string()
}

fn default_from_name() -> String {
    "Coursegate".to_string()
}

fn default_login_url() -> String {
    "https://learn.coursegate.io/login".to_string()
}

fn default_platform_name() -> String {
    "Coursegate".to_string()
}
