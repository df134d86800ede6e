//! The message envelope shared by every producer.
//!
//! Both the live connection manager and the event simulator emit the same
//! shape: `{category, payload, emitted_at}`, serialized on the wire as
//! `{"type": ..., "data": ..., "timestamp": ...}`. The category determines
//! the payload shape; consumers must never assume cross-category
//! compatibility.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use super::{FeedError, Timestamp};

/// Discriminant tag identifying which kind of domain event a message carries.
///
/// `Connection` is synthetic: it exists only for local state-change
/// notifications and is rejected if it ever arrives over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Transaction,
    UserActivity,
    SystemAlert,
    RevenueUpdate,
    UserRegistration,
    Connection,
}

impl EventCategory {
    /// The five categories a server may legitimately put on the wire.
    pub const DATA: [EventCategory; 5] = [
        EventCategory::Transaction,
        EventCategory::UserActivity,
        EventCategory::SystemAlert,
        EventCategory::RevenueUpdate,
        EventCategory::UserRegistration,
    ];

    /// Every category, including the synthetic `connection` channel.
    pub const ALL: [EventCategory; 6] = [
        EventCategory::Transaction,
        EventCategory::UserActivity,
        EventCategory::SystemAlert,
        EventCategory::RevenueUpdate,
        EventCategory::UserRegistration,
        EventCategory::Connection,
    ];

    /// True for the local-only `connection` category.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, EventCategory::Connection)
    }

    /// The snake_case wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Transaction => "transaction",
            EventCategory::UserActivity => "user_activity",
            EventCategory::SystemAlert => "system_alert",
            EventCategory::RevenueUpdate => "revenue_update",
            EventCategory::UserRegistration => "user_registration",
            EventCategory::Connection => "connection",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transport wrapper common to all feed messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Which kind of event the payload carries.
    #[serde(rename = "type")]
    pub category: EventCategory,

    /// Category-specific record, kept as JSON until a consumer decodes it.
    #[serde(rename = "data")]
    pub payload: JsonValue,

    /// When the producer emitted the event.
    #[serde(rename = "timestamp")]
    pub emitted_at: Timestamp,
}

impl EventEnvelope {
    /// Wraps a payload in an envelope stamped with the current time.
    pub fn new(category: EventCategory, payload: &(impl Serialize + ?Sized)) -> Self {
        Self {
            category,
            payload: serde_json::to_value(payload)
                .expect("event serialization should never fail for well-formed events"),
            emitted_at: Timestamp::now(),
        }
    }

    /// Parses an inbound wire frame.
    ///
    /// Fails on invalid JSON, an unknown `type`, a missing field, or the
    /// synthetic `connection` category (which never crosses the wire).
    pub fn from_wire(raw: &str) -> Result<Self, FeedError> {
        let envelope: EventEnvelope = serde_json::from_str(raw).map_err(FeedError::malformed)?;
        if envelope.category.is_synthetic() {
            return Err(FeedError::MalformedMessage(format!(
                "synthetic category '{}' is not valid on the wire",
                envelope.category
            )));
        }
        Ok(envelope)
    }

    /// Renders the envelope into its wire JSON form.
    pub fn to_wire(&self) -> String {
        serde_json::to_string(self).expect("envelope serialization should never fail")
    }

    /// Decodes the payload into its category-specific record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, FeedError> {
        serde_json::from_value(self.payload.clone()).map_err(FeedError::malformed)
    }
}

/// Trait implemented by every category-specific event record.
///
/// Provides the single conversion point from a typed record into the
/// transport envelope, so producers never hand-assemble envelopes.
pub trait FeedEvent: Serialize {
    /// The category this record belongs to.
    const CATEGORY: EventCategory;

    /// Wraps this record in an envelope stamped with the current time.
    fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope::new(Self::CATEGORY, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_form_uses_type_data_timestamp_keys() {
        let envelope = EventEnvelope::new(EventCategory::Transaction, &json!({"amount": 1500}));
        let wire = envelope.to_wire();

        assert!(wire.contains(r#""type":"transaction""#));
        assert!(wire.contains(r#""data":{"amount":1500}"#));
        assert!(wire.contains(r#""timestamp":""#));
    }

    #[test]
    fn wire_round_trip_preserves_category_and_payload() {
        let envelope = EventEnvelope::new(EventCategory::RevenueUpdate, &json!({"total": 9}));
        let back = EventEnvelope::from_wire(&envelope.to_wire()).unwrap();

        assert_eq!(back.category, EventCategory::RevenueUpdate);
        assert_eq!(back.payload, json!({"total": 9}));
        assert_eq!(back.emitted_at, envelope.emitted_at);
    }

    #[test]
    fn unknown_type_is_malformed() {
        let raw = r#"{"type":"stock_split","data":{},"timestamp":"2025-01-10T00:00:00Z"}"#;
        assert!(matches!(
            EventEnvelope::from_wire(raw),
            Err(FeedError::MalformedMessage(_))
        ));
    }

    #[test]
    fn missing_fields_are_malformed() {
        let raw = r#"{"type":"transaction"}"#;
        assert!(matches!(
            EventEnvelope::from_wire(raw),
            Err(FeedError::MalformedMessage(_))
        ));
    }

    #[test]
    fn synthetic_connection_category_is_rejected_on_the_wire() {
        let raw = r#"{"type":"connection","data":{"state":"connected"},"timestamp":"2025-01-10T00:00:00Z"}"#;
        let err = EventEnvelope::from_wire(raw).unwrap_err();
        assert!(err.to_string().contains("connection"));
    }

    #[test]
    fn decode_rejects_mismatched_shape() {
        #[derive(serde::Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            amount: u64,
        }

        let envelope = EventEnvelope::new(EventCategory::Transaction, &json!({"volume": 3}));
        assert!(envelope.decode::<Expected>().is_err());
    }
}
