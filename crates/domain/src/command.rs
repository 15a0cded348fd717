//! Command handling infrastructure.

use std::marker::PhantomData;

use common::AggregateId;
use event_store::{AppendOptions, EventEnvelope, EventStore, Version};
use serde::Serialize;

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were generated and persisted.
    pub events: Vec<A::Event>,

    /// The new version of the aggregate after the command.
    pub new_version: Version,
}

/// Trait for commands that can be executed against an aggregate.
///
/// Commands represent an intention to perform an action. They may be rejected
/// if the aggregate's current state doesn't allow the action.
pub trait Command: Send + Sync {
    /// The type of aggregate this command targets.
    type Aggregate: Aggregate;

    /// Returns the ID of the aggregate this command targets.
    fn aggregate_id(&self) -> AggregateId;
}

/// Handler for executing commands against aggregates.
///
/// The handler is responsible for:
/// 1. Loading the aggregate by replaying its events
/// 2. Executing the command to produce new events
/// 3. Persisting the events with optimistic concurrency
pub struct CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    /// Creates a new command handler with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Loads an aggregate from the event store.
    ///
    /// If the aggregate doesn't exist, returns a default instance.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError>
    where
        A::Event: for<'de> serde::Deserialize<'de>,
    {
        let events = self.store.get_events_for_aggregate(aggregate_id).await?;

        let mut aggregate = A::default();
        for envelope in events {
            let event: A::Event = serde_json::from_value(envelope.payload)?;
            aggregate.apply(event);
            aggregate.set_version(envelope.version);
        }

        Ok(aggregate)
    }

    /// Loads an aggregate, returning None if it doesn't exist.
    pub async fn load_existing(&self, aggregate_id: AggregateId) -> Result<Option<A>, DomainError>
    where
        A::Event: for<'de> serde::Deserialize<'de>,
    {
        let aggregate = self.load(aggregate_id).await?;
        if aggregate.id().is_some() {
            Ok(Some(aggregate))
        } else {
            Ok(None)
        }
    }

    /// Executes a command and persists the resulting events.
    ///
    /// The command function receives the current aggregate state and returns
    /// either a list of events to apply, or an error.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        A::Event: for<'de> serde::Deserialize<'de> + Serialize,
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let mut aggregate = self.load(aggregate_id).await?;
        let current_version = aggregate.version();

        // Execute command to get events
        let events = command_fn(&aggregate)?;

        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events: vec![],
                new_version: current_version,
            });
        }

        // Build envelopes for persistence
        let envelopes = self.build_envelopes(aggregate_id, current_version, &events)?;

        // Persist events with optimistic concurrency
        let options = if current_version == Version::initial() {
            AppendOptions::expect_new()
        } else {
            AppendOptions::expect_version(current_version)
        };

        let new_version = self.store.append(envelopes, options).await?;

        // Apply events to aggregate
        for event in &events {
            aggregate.apply(event.clone());
        }
        aggregate.set_version(new_version);

        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }

    /// Builds event envelopes from domain events.
    fn build_envelopes(
        &self,
        aggregate_id: AggregateId,
        current_version: Version,
        events: &[A::Event],
    ) -> Result<Vec<EventEnvelope>, DomainError>
    where
        A::Event: Serialize,
    {
        let mut envelopes = Vec::with_capacity(events.len());
        let mut version = current_version;

        for event in events {
            version = version.next();
            let envelope = EventEnvelope::builder()
                .aggregate_id(aggregate_id)
                .aggregate_type(A::aggregate_type())
                .event_type(event.event_type())
                .version(version)
                .payload(event)?
                .build();
            envelopes.push(envelope);
        }

        Ok(envelopes)
    }
}
