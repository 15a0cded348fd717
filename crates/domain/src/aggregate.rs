//! Core aggregate and domain event traits.

use common::AggregateId;
use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// This is used for serialization and event store filtering.
    fn event_type(&self) -> &'static str;
}

/// Trait for aggregates in an event-sourced system.
///
/// An aggregate is a cluster of domain objects that can be treated as a
/// single unit. Here the only aggregate is the checkout attempt, which owns
/// the frozen shipping address and both checkout state machines for the
/// duration of one attempt.
///
/// In event sourcing, aggregates:
/// - Are rebuilt by replaying events
/// - Generate events from commands
/// - Apply events to update state (pure, deterministic)
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's unique identifier.
    ///
    /// Returns None for a new, uninitialized aggregate.
    fn id(&self) -> Option<AggregateId>;

    /// Returns the current version of the aggregate.
    ///
    /// Version starts at 0 for a new aggregate and increments with each event.
    fn version(&self) -> Version;

    /// Sets the aggregate version.
    ///
    /// Called by the command handler after loading events.
    fn set_version(&mut self, version: Version);

    /// Applies an event to the aggregate, updating its state.
    ///
    /// This method must be pure and deterministic:
    /// - Given the same state and event, it must always produce the same new state
    /// - It must not have side effects
    /// - It must not fail (events represent facts that have happened)
    fn apply(&mut self, event: Self::Event);

    /// Applies multiple events in sequence.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum TestEvent {
        Opened { label: String },
        Counted { value: i32 },
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            match self {
                TestEvent::Opened { .. } => "TestOpened",
                TestEvent::Counted { .. } => "TestCounted",
            }
        }
    }

    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    struct TestAggregate {
        id: Option<AggregateId>,
        value: i32,
        version: Version,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("test error")]
    struct TestError;

    impl Aggregate for TestAggregate {
        type Event = TestEvent;
        type Error = TestError;

        fn aggregate_type() -> &'static str {
            "TestAggregate"
        }

        fn id(&self) -> Option<AggregateId> {
            self.id
        }

        fn version(&self) -> Version {
            self.version
        }

        fn set_version(&mut self, version: Version) {
            self.version = version;
        }

        fn apply(&mut self, event: Self::Event) {
            match event {
                TestEvent::Opened { .. } => {
                    if self.id.is_none() {
                        self.id = Some(AggregateId::new());
                    }
                }
                TestEvent::Counted { value } => {
                    self.value = value;
                }
            }
        }
    }

    #[test]
    fn apply_events_runs_in_order() {
        let mut aggregate = TestAggregate::default();
        let events = vec![
            TestEvent::Opened {
                label: "test".to_string(),
            },
            TestEvent::Counted { value: 42 },
        ];

        aggregate.apply_events(events);

        assert!(aggregate.id().is_some());
        assert_eq!(aggregate.value, 42);
    }

    #[test]
    fn domain_event_type() {
        let event = TestEvent::Opened {
            label: "test".to_string(),
        };
        assert_eq!(event.event_type(), "TestOpened");

        let event = TestEvent::Counted { value: 42 };
        assert_eq!(event.event_type(), "TestCounted");
    }
}
