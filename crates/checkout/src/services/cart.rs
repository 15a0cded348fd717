//! Cart service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{BuyerId, CartLine};

use crate::error::CheckoutError;

/// Trait for the external cart collaborator.
///
/// Cart contents are owned by the cart service; checkout only reads them
/// and clears the cart after a finalized order.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Returns the buyer's current cart lines.
    async fn get_cart(&self, buyer_id: BuyerId) -> Result<Vec<CartLine>, CheckoutError>;

    /// Clears the buyer's cart after order placement.
    async fn clear_cart(&self, buyer_id: BuyerId) -> Result<(), CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    carts: HashMap<BuyerId, Vec<CartLine>>,
    fail_on_fetch: bool,
    clears: usize,
}

/// In-memory cart service for testing and the default server wiring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartService {
    state: Arc<RwLock<InMemoryCartState>>,
}

impl InMemoryCartService {
    /// Creates a new in-memory cart service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the buyer's cart contents.
    pub fn put_cart(&self, buyer_id: BuyerId, lines: Vec<CartLine>) {
        self.state.write().unwrap().carts.insert(buyer_id, lines);
    }

    /// Configures the service to fail on the next fetch.
    pub fn set_fail_on_fetch(&self, fail: bool) {
        self.state.write().unwrap().fail_on_fetch = fail;
    }

    /// Returns the number of lines currently in the buyer's cart.
    pub fn line_count(&self, buyer_id: BuyerId) -> usize {
        self.state
            .read()
            .unwrap()
            .carts
            .get(&buyer_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Returns how many times a cart was cleared.
    pub fn clear_count(&self) -> usize {
        self.state.read().unwrap().clears
    }
}

#[async_trait]
impl CartService for InMemoryCartService {
    async fn get_cart(&self, buyer_id: BuyerId) -> Result<Vec<CartLine>, CheckoutError> {
        let state = self.state.read().unwrap();

        if state.fail_on_fetch {
            return Err(CheckoutError::Cart("cart service unreachable".to_string()));
        }

        Ok(state.carts.get(&buyer_id).cloned().unwrap_or_default())
    }

    async fn clear_cart(&self, buyer_id: BuyerId) -> Result<(), CheckoutError> {
        let mut state = self.state.write().unwrap();
        state.carts.remove(&buyer_id);
        state.clears += 1;
        Ok(())
    }
}
