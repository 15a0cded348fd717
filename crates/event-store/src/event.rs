use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AggregateId;

/// Unique identifier for an event.
///
/// Assigned by the store when an envelope is built; nothing supplies
/// explicit event ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Version number for an aggregate, used for optimistic concurrency control.
///
/// Versions start at 1 for the first event and increment by 1 for each
/// subsequent event on an aggregate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) for a new aggregate.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the first version (1) for the first event.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// An event envelope wrapping a domain event (e.g. `PaymentSettled`) with
/// the information needed for storage and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// The type of the event (e.g., "AddressConfirmed", "PaymentSettled").
    pub event_type: String,

    /// The aggregate this event belongs to.
    pub aggregate_id: AggregateId,

    /// The type of aggregate (e.g., "CheckoutAttempt").
    pub aggregate_type: String,

    /// The version of the aggregate after this event.
    pub version: Version,

    /// When the event was created.
    pub timestamp: DateTime<Utc>,

    /// The event payload as JSON.
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Creates a new event envelope builder.
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }
}

/// Builder for constructing event envelopes.
///
/// The event id and timestamp are assigned at build time; callers only
/// supply what the domain produced.
#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    event_type: Option<String>,
    aggregate_id: Option<AggregateId>,
    aggregate_type: Option<String>,
    version: Option<Version>,
    payload: Option<serde_json::Value>,
}

impl EventEnvelopeBuilder {
    /// Sets the event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the aggregate ID.
    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    /// Sets the aggregate type.
    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    /// Sets the version.
    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Builds the event envelope.
    ///
    /// # Panics
    ///
    /// Panics if required fields (event_type, aggregate_id, aggregate_type,
    /// version, payload) are not set.
    pub fn build(self) -> EventEnvelope {
        EventEnvelope {
            event_id: EventId::new(),
            event_type: self.event_type.expect("event_type is required"),
            aggregate_id: self.aggregate_id.expect("aggregate_id is required"),
            aggregate_type: self.aggregate_type.expect("aggregate_type is required"),
            version: self.version.expect("version is required"),
            timestamp: Utc::now(),
            payload: self.payload.expect("payload is required"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_new_creates_unique_ids() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn version_ordering() {
        let v1 = Version::new(1);
        let v2 = Version::new(2);
        assert!(v1 < v2);
        assert_eq!(v1.next(), v2);
    }

    #[test]
    fn version_initial_and_first() {
        assert_eq!(Version::initial().as_i64(), 0);
        assert_eq!(Version::first().as_i64(), 1);
        assert_eq!(Version::initial().next(), Version::first());
    }

    #[test]
    fn event_envelope_builder() {
        let aggregate_id = AggregateId::new();
        let payload = serde_json::json!({"gateway_order_id": "order_0001"});

        let envelope = EventEnvelope::builder()
            .event_type("GatewayOpened")
            .aggregate_id(aggregate_id)
            .aggregate_type("CheckoutAttempt")
            .version(Version::first())
            .payload_raw(payload.clone())
            .build();

        assert_eq!(envelope.event_type, "GatewayOpened");
        assert_eq!(envelope.aggregate_id, aggregate_id);
        assert_eq!(envelope.aggregate_type, "CheckoutAttempt");
        assert_eq!(envelope.version, Version::first());
        assert_eq!(envelope.payload, payload);
    }
}
