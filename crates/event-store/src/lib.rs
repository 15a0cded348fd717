//! Append-only event store for checkout attempts.
//!
//! An attempt's whole lifecycle (address confirmed, payment initiated,
//! gateway outcome, verification, settlement) is recorded as an ordered
//! event stream with optimistic concurrency on append. The store is the
//! mechanism behind the at-most-once settlement guarantee: a duplicate
//! settlement append conflicts instead of silently succeeding.

pub mod error;
pub mod event;
pub mod memory;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, Version};
pub use memory::InMemoryEventStore;
pub use store::{AppendOptions, EventStore, EventStoreExt};
