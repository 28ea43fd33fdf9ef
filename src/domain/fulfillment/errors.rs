//! Error types for webhook intake and fulfillment.
//!
//! Defines all error conditions across the pipeline, with HTTP status
//! code mapping for the intake path and retryability semantics for the
//! async fulfillment path.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors from re-fetching an event against the provider API.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Provider API was unreachable or answered with a server error.
    #[error("Event lookup transport failure: {message}")]
    Transport { message: String },

    /// Provider answered but the body did not decode as an event.
    #[error("Unreadable event response: {message}")]
    InvalidResponse { message: String },

    /// Provider has no event under the requested id.
    #[error("Event not found: {event_id}")]
    NotFound { event_id: String },

    /// Fetched event id differs from the requested one.
    #[error("Event id mismatch: requested {requested}, provider returned {fetched}")]
    Mismatch { requested: String, fetched: String },
}

/// Errors from the identity, enrollment and email adapters.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Network failure or 5xx from the external service.
    #[error("{service} transport failure: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    /// The service answered and refused the request.
    #[error("{service} rejected the request: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },
}

impl AdapterError {
    pub fn transport(service: &'static str, message: impl Into<String>) -> Self {
        AdapterError::Transport {
            service,
            message: message.into(),
        }
    }

    pub fn rejected(service: &'static str, message: impl Into<String>) -> Self {
        AdapterError::Rejected {
            service,
            message: message.into(),
        }
    }

    /// Returns true if the failure is transient network trouble rather
    /// than an authoritative refusal.
    pub fn is_transport(&self) -> bool {
        matches!(self, AdapterError::Transport { .. })
    }
}

/// Errors from a fulfillment run over an order and its line items.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// No order exists for the charge the task was scheduled with.
    #[error("Order not found for charge {charge_id}")]
    OrderNotFound { charge_id: String },

    /// Attempted state transition is not valid.
    #[error("Invalid state transition: {0}")]
    IllegalTransition(String),

    /// Persistence operation failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Identity lookup for a recipient failed.
    #[error("Identity lookup failed for {email}: {source}")]
    IdentityLookup {
        email: String,
        #[source]
        source: AdapterError,
    },

    /// Account provisioning for a recipient failed.
    #[error("Account creation failed for {email}: {source}")]
    AccountCreation {
        email: String,
        #[source]
        source: AdapterError,
    },

    /// Course enrollment for a recipient failed.
    #[error("Enrollment failed for {email} in {course_id}: {source}")]
    Enrollment {
        course_id: String,
        email: String,
        #[source]
        source: AdapterError,
    },

    /// One or more items failed while the rest were still attempted.
    #[error("{} line item(s) failed: {}", failures.len(), failures.join("; "))]
    ItemsFailed { failures: Vec<String> },
}

impl FulfillmentError {
    /// Returns true if the task runner should retry this attempt.
    ///
    /// Retries are restricted to transport-class adapter failures. A
    /// refusal from the service, a persistence error or a missing order
    /// will not improve by retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            FulfillmentError::IdentityLookup { source, .. }
            | FulfillmentError::AccountCreation { source, .. }
            | FulfillmentError::Enrollment { source, .. } => source.is_transport(),
            _ => false,
        }
    }
}

impl From<DomainError> for FulfillmentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidStateTransition => FulfillmentError::IllegalTransition(err.to_string()),
            _ => FulfillmentError::Store(err.to_string()),
        }
    }
}

/// Errors on the synchronous webhook intake path.
///
/// These are the only errors the delivering provider ever observes. The
/// async fulfillment outcome is operator-visible only.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Request body was not a JSON object we can work with.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Payload parsed but carried no event id to verify.
    #[error("Missing event id")]
    MissingEventId,

    /// The provider-side event lookup failed.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// Persistence operation failed during intake.
    #[error("Store error: {0}")]
    Store(String),
}

impl WebhookError {
    /// Maps the error to the HTTP status returned to the provider.
    ///
    /// Status codes determine the provider's redelivery behavior:
    /// - 4xx: payload is bad, redelivery will not help
    /// - 5xx: our side failed, provider should redeliver
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MalformedPayload(_) | WebhookError::MissingEventId => {
                StatusCode::BAD_REQUEST
            }

            // The provider disowning the event means the payload lied
            WebhookError::Verification(VerificationError::NotFound { .. })
            | WebhookError::Verification(VerificationError::Mismatch { .. }) => {
                StatusCode::BAD_REQUEST
            }

            // Our round trip failed, redelivery may succeed
            WebhookError::Verification(VerificationError::Transport { .. })
            | WebhookError::Verification(VerificationError::InvalidResponse { .. })
            | WebhookError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Store(err.to_string())
    }
}
