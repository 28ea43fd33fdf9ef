//! HTTP DTOs (Data Transfer Objects) for the webhook intake endpoint.
//!
//! These types define the JSON response structure for the intake API.
//! They serve as the boundary between HTTP and the application layer.

use serde::Serialize;

use crate::application::handlers::fulfillment::HandlePaymentWebhookResult;

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Acknowledgement returned for an accepted webhook delivery.
///
/// Every accepted delivery is acknowledged with HTTP 200; `action` tells
/// the operator what the intake did with it.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    /// What the intake did with the delivery.
    pub action: &'static str,
    /// Charge the delivery resolved to, when one was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_id: Option<String>,
    /// Event type, for deliveries acknowledged without action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

impl From<HandlePaymentWebhookResult> for WebhookAckResponse {
    fn from(result: HandlePaymentWebhookResult) -> Self {
        match result {
            HandlePaymentWebhookResult::Scheduled { charge_id } => Self {
                action: "scheduled",
                charge_id: Some(charge_id),
                event_type: None,
            },
            HandlePaymentWebhookResult::NoActionTaken { charge_id } => Self {
                action: "no_action",
                charge_id: Some(charge_id),
                event_type: None,
            },
            HandlePaymentWebhookResult::ChargeFailed { charge_id } => Self {
                action: "charge_failed",
                charge_id: Some(charge_id),
                event_type: None,
            },
            HandlePaymentWebhookResult::Ignored { event_type } => Self {
                action: "ignored",
                charge_id: None,
                event_type: Some(event_type),
            },
        }
    }
}

/// Response for the liveness probe.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
