//! Order backend trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{BuyerId, Money};
use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;

/// A persisted order, returned by the order backend after finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Backend-assigned order reference.
    pub order_ref: String,

    /// The buyer the order belongs to.
    pub buyer_id: BuyerId,

    /// Total charged for the order.
    pub total: Money,

    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
}

/// Trait for the external order backend collaborator.
///
/// Called only after a payment has settled. The real backend converts the
/// cart it holds for the buyer into an order; the settled amount is passed
/// along so the record reflects what was actually charged.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Converts the buyer's cart into a persisted order.
    async fn place_order(
        &self,
        buyer_id: BuyerId,
        amount: Money,
    ) -> Result<OrderRecord, CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: Vec<OrderRecord>,
    next_ref: u32,
    fail_on_place: bool,
}

/// In-memory order backend for testing and the default server wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderBackend {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderBackend {
    /// Creates a new in-memory order backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to fail on the next placement.
    pub fn set_fail_on_place(&self, fail: bool) {
        self.state.write().unwrap().fail_on_place = fail;
    }

    /// Returns the number of orders placed.
    pub fn order_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }

    /// Returns the most recently placed order, if any.
    pub fn last_order(&self) -> Option<OrderRecord> {
        self.state.read().unwrap().orders.last().cloned()
    }
}

#[async_trait]
impl OrderBackend for InMemoryOrderBackend {
    async fn place_order(
        &self,
        buyer_id: BuyerId,
        amount: Money,
    ) -> Result<OrderRecord, CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_place {
            return Err(CheckoutError::OrderPlacementFailed {
                reason: "order service unavailable".to_string(),
            });
        }

        state.next_ref += 1;
        let record = OrderRecord {
            order_ref: format!("ORD-{:04}", state.next_ref),
            buyer_id,
            total: amount,
            placed_at: Utc::now(),
        };
        state.orders.push(record.clone());

        Ok(record)
    }
}
