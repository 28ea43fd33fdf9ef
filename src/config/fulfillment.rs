//! Fulfillment task configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::fulfillment::ItemFailurePolicy;

use super::error::ValidationError;

/// Fulfillment task configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FulfillmentConfig {
    /// Retry attempts after the first failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Soft time limit per attempt in seconds
    #[serde(default = "default_soft_time_limit")]
    pub soft_time_limit_secs: u64,

    /// Base delay for exponential backoff in milliseconds
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,

    /// Policy for the remaining items when one fails
    #[serde(default)]
    pub item_failure_policy: ItemFailurePolicy,
}

impl FulfillmentConfig {
    /// Get soft time limit as Duration
    pub fn soft_time_limit(&self) -> Duration {
        Duration::from_secs(self.soft_time_limit_secs)
    }

    /// Get retry base delay as Duration
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Validate fulfillment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.soft_time_limit_secs == 0 || self.soft_time_limit_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_retries > 10 {
            return Err(ValidationError::InvalidRetryLimit);
        }
        Ok(())
    }
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            soft_time_limit_secs: default_soft_time_limit(),
            retry_base_delay_ms: default_retry_base_delay(),
            item_failure_policy: ItemFailurePolicy::default(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_soft_time_limit() -> u64 {
    5
}

fn default_retry_base_delay() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fulfillment_config_defaults() {
        let config = FulfillmentConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.soft_time_limit_secs, 5);
        assert_eq!(config.retry_base_delay_ms, 1000);
        assert_eq!(config.item_failure_policy, ItemFailurePolicy::FailFast);
    }

    #[test]
    fn test_durations() {
        let config = FulfillmentConfig {
            soft_time_limit_secs: 7,
            retry_base_delay_ms: 250,
            ..Default::default()
        };
        assert_eq!(config.soft_time_limit(), Duration::from_secs(7));
        assert_eq!(config.retry_base_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_validation_zero_time_limit() {
        let config = FulfillmentConfig {
            soft_time_limit_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_excessive_time_limit() {
        let config = FulfillmentConfig {
            soft_time_limit_secs: 500,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_excessive_retries() {
        let config = FulfillmentConfig {
            max_retries: 50,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(FulfillmentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_policy_deserializes_from_snake_case() {
        let config: FulfillmentConfig =
            serde_json::from_str(r#"{"item_failure_policy": "continue_remaining"}"#).unwrap();
        assert_eq!(
            config.item_failure_policy,
            ItemFailurePolicy::ContinueRemaining
        );
    }
}
