//! Omise webhook event types.
//!
//! Defines the structures for the provider's authoritative event
//! representation, as returned by the event-lookup endpoint. Only fields
//! relevant to our processing are captured; inbound payload fields are
//! never trusted directly.

use serde::{Deserialize, Serialize};

/// Omise event (simplified).
///
/// Decoding is deliberately tolerant: everything except the event id
/// defaults when absent, so that malformed but identifiable events can
/// still be recorded and rejected with a useful diagnostic.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OmiseEvent {
    /// Unique identifier for the event (evnt_xxx format).
    #[serde(default)]
    pub id: String,

    /// Type of event (e.g., "charge.complete").
    #[serde(rename = "type", default)]
    pub event_type: String,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,

    /// Time at which the event was created (RFC 3339).
    #[serde(default)]
    pub created: Option<String>,

    /// Object containing event-specific data.
    #[serde(default)]
    pub data: OmiseEventData,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OmiseEventData {
    /// The object that triggered the event (polymorphic based on event type).
    #[serde(default)]
    pub object: serde_json::Value,
}

impl OmiseEvent {
    /// Returns true if this is a live mode event.
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    /// Returns true if this is a test mode event.
    pub fn is_test(&self) -> bool {
        !self.livemode
    }

    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> OmiseEventType {
        OmiseEventType::from_str(&self.event_type)
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

/// Known Omise event types that we handle.
///
/// Only these proceed to fulfillment; every other kind decodes to
/// `Unknown` and is acknowledged without further action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OmiseEventType {
    /// Charge finished, successfully or not; the charge status decides.
    ChargeComplete,
    /// Charge failed outright.
    ChargeFailed,
    /// Unknown or unhandled event type.
    Unknown,
}

impl OmiseEventType {
    /// Parse event type from string.
    pub fn from_str(s: &str) -> Self {
        match s {
            "charge.complete" => Self::ChargeComplete,
            "charge.failed" => Self::ChargeFailed,
            _ => Self::Unknown,
        }
    }

    /// Convert to the Omise event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChargeComplete => "charge.complete",
            Self::ChargeFailed => "charge.failed",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true if this event kind drives fulfillment.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Charge object carried by charge.* events.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Charge {
    /// Provider-assigned charge identifier (chrg_xxx format).
    pub id: String,

    /// Outcome of the charge attempt.
    #[serde(default)]
    pub status: ChargeStatus,

    /// Charge amount in the smallest currency unit.
    #[serde(default)]
    pub amount: i64,

    /// ISO currency code.
    #[serde(default)]
    pub currency: String,

    /// Purchaser metadata attached at checkout.
    #[serde(default)]
    pub metadata: ChargeMetadata,

    /// Card details, when the charge was card-based.
    #[serde(default)]
    pub card: Option<Card>,

    /// Purchased units, one per course enrollment.
    #[serde(default)]
    pub line_items: Vec<ChargeLineItem>,
}

/// Charge outcome as reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Successful,
    Failed,
    Pending,
    Expired,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ChargeStatus {
    /// Returns true if the charge was paid.
    pub fn is_successful(&self) -> bool {
        matches!(self, ChargeStatus::Successful)
    }
}

/// Metadata attached to the charge at checkout.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChargeMetadata {
    /// Purchaser email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Card details on a card-based charge.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Card {
    /// Cardholder name as entered.
    #[serde(default)]
    pub name: Option<String>,
}

/// One purchased unit within a charge.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChargeLineItem {
    /// Optional stock keeping unit, carried through for bookkeeping.
    #[serde(default)]
    pub sku: Option<String>,

    /// Enrollment target for this unit.
    #[serde(default)]
    pub metadata: LineItemMetadata,
}

/// Per-item metadata naming the enrollment target.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LineItemMetadata {
    /// Learner email for this item.
    #[serde(default)]
    pub email: Option<String>,

    /// Course to enroll in.
    #[serde(default, rename = "courseId")]
    pub course_id: Option<String>,
}

/// Builder for creating test OmiseEvent instances.
#[cfg(test)]
pub struct OmiseEventBuilder {
    id: String,
    event_type: String,
    livemode: bool,
    created: Option<String>,
    object: serde_json::Value,
}

#[cfg(test)]
impl Default for OmiseEventBuilder {
    fn default() -> Self {
        Self {
            id: "evnt_test_123".to_string(),
            event_type: "charge.complete".to_string(),
            livemode: false,
            created: Some("2024-01-15T03:22:12Z".to_string()),
            object: serde_json::json!({}),
        }
    }
}

#[cfg(test)]
impl OmiseEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> OmiseEvent {
        OmiseEvent {
            id: self.id,
            event_type: self.event_type,
            livemode: self.livemode,
            created: self.created,
            data: OmiseEventData { object: self.object },
        }
    }
}
