//! HTTP handlers for webhook intake endpoints.
//!
//! These handlers connect Axum routes to the application layer intake handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::fulfillment::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
};
use crate::domain::fulfillment::{VerificationError, WebhookError};
use crate::ports::{EventVerifier, FulfillmentScheduler, OrderStore, WebhookRecordStore};

use super::dto::{ErrorResponse, HealthResponse, WebhookAckResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing the intake dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct WebhookAppState {
    pub webhook_records: Arc<dyn WebhookRecordStore>,
    pub event_verifier: Arc<dyn EventVerifier>,
    pub orders: Arc<dyn OrderStore>,
    pub fulfillment_scheduler: Arc<dyn FulfillmentScheduler>,
}

impl WebhookAppState {
    /// Create the intake handler on demand from the shared state.
    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.webhook_records.clone(),
            self.event_verifier.clone(),
            self.orders.clone(),
            self.fulfillment_scheduler.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/omise - Handle Omise webhook deliveries
///
/// The raw body and headers are taken as-is; the application layer records
/// them before any parsing, so rejected deliveries still leave a trace.
pub async fn handle_omise_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let handler = state.webhook_handler();
    let cmd = HandlePaymentWebhookCommand {
        payload: String::from_utf8_lossy(&body).into_owned(),
        headers: flatten_headers(&headers),
    };

    let result = handler.handle(cmd).await?;

    Ok((StatusCode::OK, Json(WebhookAckResponse::from(result))))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Flattens request headers into string pairs for the audit record.
///
/// Header values are not guaranteed to be UTF-8; undecodable bytes are
/// replaced rather than dropped so the record keeps every header name.
fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts intake errors to HTTP responses.
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let error_code = match &self.0 {
            WebhookError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            WebhookError::MissingEventId => "MISSING_EVENT_ID",
            WebhookError::Verification(VerificationError::NotFound { .. }) => "EVENT_NOT_FOUND",
            WebhookError::Verification(VerificationError::Mismatch { .. }) => "EVENT_ID_MISMATCH",
            WebhookError::Verification(_) => "VERIFICATION_UNAVAILABLE",
            WebhookError::Store(_) => "INTERNAL_ERROR",
        };

        let status = self.0.status_code();
        let body = ErrorResponse::new(error_code, self.0.to_string());
        (status, Json(body)).into_response()
    }
}
