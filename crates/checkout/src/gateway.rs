//! Payment gateway loading and the awaitable widget contract.
//!
//! The gateway's client script is a shared mutable resource: the
//! [`GatewayLoader`] is its sole owner and sole mutator, and nothing else
//! may hold a client handle before `ensure_loaded` resolves. The widget's
//! three callbacks (success, failure, dismiss) are collapsed into one
//! awaitable [`PaymentOutcome`], consumed exactly once per collection.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::ShippingAddress;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::CheckoutError;
use crate::services::PaymentIntent;

/// Contact fields prefilled into the gateway widget from the frozen
/// shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

impl CustomerPrefill {
    /// Builds the prefill from a frozen shipping address.
    pub fn from_address(address: &ShippingAddress) -> Self {
        Self {
            name: address.full_name.clone(),
            email: address.email.clone(),
            contact: address.phone.clone(),
        }
    }
}

/// The single result of one interactive gateway collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOutcome {
    /// The gateway reported success; must still be verified server-side.
    Success {
        gateway_order_id: String,
        gateway_payment_id: String,
        signature: String,
    },

    /// The gateway reported a failed payment (card declined, etc.).
    Failure {
        gateway_order_id: Option<String>,
        gateway_payment_id: Option<String>,
        reason: String,
    },

    /// The buyer dismissed the widget.
    Cancelled,
}

/// A loaded gateway client, able to run one interactive collection.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Opens the widget for the given intent and resolves once the buyer's
    /// interaction produces an outcome.
    ///
    /// An `Err` here is an unexpected widget error, not a payment failure;
    /// payment failures and cancellations arrive as [`PaymentOutcome`]s.
    async fn collect_payment(
        &self,
        intent: &PaymentIntent,
        prefill: CustomerPrefill,
    ) -> Result<PaymentOutcome, CheckoutError>;
}

/// Source of fresh gateway clients (the "script injection" seam).
#[async_trait]
pub trait GatewayProvider: Send + Sync {
    /// The client type this provider produces.
    type Client: GatewayClient + Send + Sync + 'static;

    /// Fetches a fresh client instance.
    async fn load(&self) -> Result<Self::Client, CheckoutError>;
}

struct Slot<C> {
    client: Option<Arc<C>>,
    loaded_epoch: u64,
}

impl<C> Default for Slot<C> {
    fn default() -> Self {
        Self {
            client: None,
            loaded_epoch: 0,
        }
    }
}

/// Sole owner of the gateway client handle.
///
/// `ensure_loaded` discards any stale handle and fetches a fresh one, so a
/// previously initialized client is never reused across payment attempts.
/// Overlapping calls coalesce: a caller that was waiting while another call
/// completed a load reuses that load instead of injecting a second one.
pub struct GatewayLoader<P: GatewayProvider> {
    provider: P,
    slot: Mutex<Slot<P::Client>>,
    epoch: AtomicU64,
}

impl<P: GatewayProvider> GatewayLoader<P> {
    /// Creates a loader over the given provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            slot: Mutex::new(Slot::default()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Returns a fresh, ready gateway client.
    ///
    /// On failure the slot is left empty and the error is recoverable: the
    /// caller reports the gateway unavailable and the buyer may retry.
    pub async fn ensure_loaded(&self) -> Result<Arc<P::Client>, CheckoutError> {
        let requested = self.epoch.load(Ordering::Acquire);
        let mut slot = self.slot.lock().await;

        // A load that completed while this call waited for the lock is
        // fresh enough; don't inject a second client.
        if slot.loaded_epoch > requested
            && let Some(client) = &slot.client
        {
            return Ok(client.clone());
        }

        // Drop the stale handle before fetching a fresh one.
        slot.client = None;

        let client = Arc::new(self.provider.load().await?);
        let loaded = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        slot.loaded_epoch = loaded;
        slot.client = Some(client.clone());

        Ok(client)
    }
}

/// Deterministic signature scheme shared by the in-memory gateway and the
/// in-memory payment backend.
pub fn stub_signature(gateway_order_id: &str, gateway_payment_id: &str) -> String {
    format!("sig_{gateway_order_id}_{gateway_payment_id}")
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    load_count: usize,
    fail_on_load: bool,
    fail_on_collect: bool,
    next_payment: u32,
    scripted: VecDeque<PaymentOutcome>,
    opened: Vec<OpenedCollection>,
}

/// Record of one widget opening, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedCollection {
    pub gateway_order_id: String,
    pub amount_paise: i64,
    pub prefill: CustomerPrefill,
}

/// In-memory gateway provider for testing and the default server wiring.
///
/// Scripted outcomes are shared across the clients it produces, so a test
/// can queue a failure before the payment attempt that will consume it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGatewayProvider {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryGatewayProvider {
    /// Creates a new in-memory provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the next load to fail.
    pub fn set_fail_on_load(&self, fail: bool) {
        self.state.write().unwrap().fail_on_load = fail;
    }

    /// Configures collections to fail with an unexpected widget error.
    pub fn set_fail_on_collect(&self, fail: bool) {
        self.state.write().unwrap().fail_on_collect = fail;
    }

    /// Queues an outcome for the next collection. Without a scripted
    /// outcome, collections succeed with a matching signature.
    pub fn push_outcome(&self, outcome: PaymentOutcome) {
        self.state.write().unwrap().scripted.push_back(outcome);
    }

    /// Returns how many times a client was loaded.
    pub fn load_count(&self) -> usize {
        self.state.read().unwrap().load_count
    }

    /// Returns how many collections were opened.
    pub fn open_count(&self) -> usize {
        self.state.read().unwrap().opened.len()
    }

    /// Returns the most recent opened collection, if any.
    pub fn last_opened(&self) -> Option<OpenedCollection> {
        self.state.read().unwrap().opened.last().cloned()
    }
}

#[async_trait]
impl GatewayProvider for InMemoryGatewayProvider {
    type Client = InMemoryGateway;

    async fn load(&self) -> Result<Self::Client, CheckoutError> {
        // Simulates the script fetch crossing the network.
        tokio::task::yield_now().await;

        let mut state = self.state.write().unwrap();
        if state.fail_on_load {
            return Err(CheckoutError::GatewayUnavailable(
                "gateway script failed to load".to_string(),
            ));
        }

        state.load_count += 1;
        Ok(InMemoryGateway {
            state: self.state.clone(),
        })
    }
}

/// In-memory gateway client produced by [`InMemoryGatewayProvider`].
#[derive(Debug, Clone)]
pub struct InMemoryGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

#[async_trait]
impl GatewayClient for InMemoryGateway {
    async fn collect_payment(
        &self,
        intent: &PaymentIntent,
        prefill: CustomerPrefill,
    ) -> Result<PaymentOutcome, CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_collect {
            return Err(CheckoutError::Gateway(
                "gateway widget crashed".to_string(),
            ));
        }

        state.opened.push(OpenedCollection {
            gateway_order_id: intent.gateway_order_id.clone(),
            amount_paise: intent.amount.paise(),
            prefill,
        });

        if let Some(outcome) = state.scripted.pop_front() {
            return Ok(outcome);
        }

        state.next_payment += 1;
        let gateway_payment_id = format!("pay_{:04}", state.next_payment);
        Ok(PaymentOutcome::Success {
            gateway_order_id: intent.gateway_order_id.clone(),
            signature: stub_signature(&intent.gateway_order_id, &gateway_payment_id),
            gateway_payment_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Money;

    fn intent(order_id: &str) -> PaymentIntent {
        PaymentIntent {
            gateway_order_id: order_id.to_string(),
            amount: Money::from_rupees(550),
            currency: "INR".to_string(),
            key_id: "rzp_test_k3ymarket".to_string(),
        }
    }

    fn prefill() -> CustomerPrefill {
        CustomerPrefill {
            name: "Asha Gond".to_string(),
            email: "asha@example.com".to_string(),
            contact: "9876543210".to_string(),
        }
    }

    #[tokio::test]
    async fn sequential_loads_produce_fresh_clients() {
        let provider = InMemoryGatewayProvider::new();
        let loader = GatewayLoader::new(provider.clone());

        let c1 = loader.ensure_loaded().await.unwrap();
        let c2 = loader.ensure_loaded().await.unwrap();

        // Each payment attempt gets a freshly loaded client
        assert!(!Arc::ptr_eq(&c1, &c2));
        assert_eq!(provider.load_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_loads_coalesce() {
        let provider = InMemoryGatewayProvider::new();
        let loader = GatewayLoader::new(provider.clone());

        let (a, b) = tokio::join!(loader.ensure_loaded(), loader.ensure_loaded());
        let a = a.unwrap();
        let b = b.unwrap();

        // At most one injected client for overlapping calls
        assert_eq!(provider.load_count(), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn load_failure_is_recoverable() {
        let provider = InMemoryGatewayProvider::new();
        let loader = GatewayLoader::new(provider.clone());

        provider.set_fail_on_load(true);
        let result = loader.ensure_loaded().await;
        assert!(matches!(result, Err(CheckoutError::GatewayUnavailable(_))));

        // A later retry succeeds once the network recovers
        provider.set_fail_on_load(false);
        assert!(loader.ensure_loaded().await.is_ok());
    }

    #[tokio::test]
    async fn default_collection_succeeds_with_matching_signature() {
        let provider = InMemoryGatewayProvider::new();
        let client = provider.load().await.unwrap();

        let outcome = client
            .collect_payment(&intent("order_0001"), prefill())
            .await
            .unwrap();

        match outcome {
            PaymentOutcome::Success {
                gateway_order_id,
                gateway_payment_id,
                signature,
            } => {
                assert_eq!(gateway_order_id, "order_0001");
                assert_eq!(
                    signature,
                    stub_signature(&gateway_order_id, &gateway_payment_id)
                );
            }
            other => panic!("expected success, got {other:?}"),
        }

        assert_eq!(provider.open_count(), 1);
        assert_eq!(provider.last_opened().unwrap().amount_paise, 55_000);
    }

    #[tokio::test]
    async fn scripted_outcomes_are_consumed_in_order() {
        let provider = InMemoryGatewayProvider::new();
        provider.push_outcome(PaymentOutcome::Cancelled);
        provider.push_outcome(PaymentOutcome::Failure {
            gateway_order_id: Some("order_0001".to_string()),
            gateway_payment_id: None,
            reason: "card declined".to_string(),
        });

        let client = provider.load().await.unwrap();

        let first = client
            .collect_payment(&intent("order_0001"), prefill())
            .await
            .unwrap();
        assert_eq!(first, PaymentOutcome::Cancelled);

        let second = client
            .collect_payment(&intent("order_0002"), prefill())
            .await
            .unwrap();
        assert!(matches!(second, PaymentOutcome::Failure { .. }));

        // Queue exhausted: back to default success
        let third = client
            .collect_payment(&intent("order_0003"), prefill())
            .await
            .unwrap();
        assert!(matches!(third, PaymentOutcome::Success { .. }));
    }

    #[tokio::test]
    async fn widget_crash_is_an_error_not_an_outcome() {
        let provider = InMemoryGatewayProvider::new();
        provider.set_fail_on_collect(true);
        let client = provider.load().await.unwrap();

        let result = client.collect_payment(&intent("order_0001"), prefill()).await;
        assert!(matches!(result, Err(CheckoutError::Gateway(_))));
    }

    #[test]
    fn prefill_uses_frozen_address_contact_fields() {
        let mut form = domain::AddressForm::new();
        form.set_full_name("Asha Gond");
        form.set_phone("9876543210");
        form.set_email("asha@example.com");
        form.set_address_line("12 Forest Lane");
        form.set_city("Bhopal");
        form.set_pincode("462001");
        let address = form.validate().unwrap();

        let prefill = CustomerPrefill::from_address(&address);
        assert_eq!(prefill.name, "Asha Gond");
        assert_eq!(prefill.contact, "9876543210");
        assert_eq!(prefill.email, "asha@example.com");
    }
}
