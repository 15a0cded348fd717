//! Payment backend trait and in-memory implementation.
//!
//! The backend owns intent creation and settlement verification; the client
//! never treats a gateway callback as proof of payment on its own.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{BuyerId, Money};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::stub_signature;

/// A backend-issued authorization to collect a specific amount.
///
/// Lives for one checkout attempt; never persisted client-side beyond it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Gateway-scoped order id.
    pub gateway_order_id: String,

    /// Canonical amount to charge, as computed by the backend.
    pub amount: Money,

    /// Charge currency.
    pub currency: String,

    /// Public key the widget must be opened with.
    pub key_id: String,
}

/// The triple a gateway success callback must present for verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationClaim {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

/// Best-effort report of a gateway-reported payment failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayFailureReport {
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub reason: String,
}

/// Errors from the payment backend, one per user-visible rejection class.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentBackendError {
    /// One or more cart items are out of stock.
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    /// The cart the backend holds for this buyer is unusable.
    #[error("Invalid cart: {0}")]
    InvalidCart(String),

    /// The buyer is not authorized for this operation.
    #[error("Not authorized")]
    Unauthorized,

    /// The backend could not be reached.
    #[error("Payment service unreachable: {0}")]
    Network(String),

    /// The backend rejected the request (bad signature, consumed payment,
    /// amount mismatch).
    #[error("Rejected by payment service: {0}")]
    Rejected(String),
}

/// Trait for the external order/payment backend collaborator.
#[async_trait]
pub trait PaymentBackend: Send + Sync {
    /// Creates a payment intent for the buyer.
    ///
    /// `amount` is the client's locally computed total; the backend
    /// recomputes from the cart it holds and returns the canonical amount
    /// in the intent.
    async fn create_intent(
        &self,
        buyer_id: BuyerId,
        amount: Money,
    ) -> Result<PaymentIntent, PaymentBackendError>;

    /// Verifies a gateway success callback server-side.
    async fn verify_payment(&self, claim: &VerificationClaim) -> Result<(), PaymentBackendError>;

    /// Records a gateway-reported failure. Fire-and-forget from the
    /// caller's point of view.
    async fn log_failure(&self, report: &GatewayFailureReport) -> Result<(), PaymentBackendError>;
}

#[derive(Debug)]
struct InMemoryBackendState {
    key_id: String,
    next_order: u32,
    intents: HashMap<String, (BuyerId, Money)>,
    canonical_amount: Option<Money>,
    fail_on_create: Option<PaymentBackendError>,
    fail_on_verify: Option<String>,
    fail_on_log: bool,
    failure_reports: Vec<GatewayFailureReport>,
    verified: Vec<String>,
}

impl Default for InMemoryBackendState {
    fn default() -> Self {
        Self {
            key_id: "rzp_test_k3ymarket".to_string(),
            next_order: 0,
            intents: HashMap::new(),
            canonical_amount: None,
            fail_on_create: None,
            fail_on_verify: None,
            fail_on_log: false,
            failure_reports: Vec::new(),
            verified: Vec::new(),
        }
    }
}

/// In-memory payment backend for testing and the default server wiring.
///
/// Issues sequential gateway order ids and accepts exactly the signature
/// the in-memory gateway produces for a given order/payment pair.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentBackend {
    state: Arc<RwLock<InMemoryBackendState>>,
}

impl InMemoryPaymentBackend {
    /// Creates a new in-memory payment backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the key id returned in intents (e.g. a live key).
    pub fn set_key_id(&self, key_id: impl Into<String>) {
        self.state.write().unwrap().key_id = key_id.into();
    }

    /// Makes the backend return a canonical amount different from the
    /// client's request.
    pub fn set_canonical_amount(&self, amount: Money) {
        self.state.write().unwrap().canonical_amount = Some(amount);
    }

    /// Configures intent creation to fail with the given error.
    pub fn set_fail_on_create(&self, error: Option<PaymentBackendError>) {
        self.state.write().unwrap().fail_on_create = error;
    }

    /// Configures verification to be rejected with the given reason.
    pub fn set_fail_on_verify(&self, reason: Option<String>) {
        self.state.write().unwrap().fail_on_verify = reason;
    }

    /// Configures failure logging to fail.
    pub fn set_fail_on_log(&self, fail: bool) {
        self.state.write().unwrap().fail_on_log = fail;
    }

    /// Returns the number of intents created.
    pub fn intent_count(&self) -> usize {
        self.state.read().unwrap().intents.len()
    }

    /// Returns the canonical amount recorded for a gateway order.
    pub fn intent_amount(&self, gateway_order_id: &str) -> Option<Money> {
        self.state
            .read()
            .unwrap()
            .intents
            .get(gateway_order_id)
            .map(|(_, amount)| *amount)
    }

    /// Returns the number of failure reports received.
    pub fn failure_report_count(&self) -> usize {
        self.state.read().unwrap().failure_reports.len()
    }

    /// Returns the most recent failure report, if any.
    pub fn last_failure_report(&self) -> Option<GatewayFailureReport> {
        self.state.read().unwrap().failure_reports.last().cloned()
    }

    /// Returns the number of successfully verified payments.
    pub fn verified_count(&self) -> usize {
        self.state.read().unwrap().verified.len()
    }
}

#[async_trait]
impl PaymentBackend for InMemoryPaymentBackend {
    async fn create_intent(
        &self,
        buyer_id: BuyerId,
        amount: Money,
    ) -> Result<PaymentIntent, PaymentBackendError> {
        let mut state = self.state.write().unwrap();

        if let Some(error) = &state.fail_on_create {
            return Err(error.clone());
        }

        state.next_order += 1;
        let gateway_order_id = format!("order_{:04}", state.next_order);
        let canonical = state.canonical_amount.unwrap_or(amount);
        state
            .intents
            .insert(gateway_order_id.clone(), (buyer_id, canonical));

        Ok(PaymentIntent {
            gateway_order_id,
            amount: canonical,
            currency: "INR".to_string(),
            key_id: state.key_id.clone(),
        })
    }

    async fn verify_payment(&self, claim: &VerificationClaim) -> Result<(), PaymentBackendError> {
        let mut state = self.state.write().unwrap();

        if let Some(reason) = &state.fail_on_verify {
            return Err(PaymentBackendError::Rejected(reason.clone()));
        }

        if !state.intents.contains_key(&claim.gateway_order_id) {
            return Err(PaymentBackendError::Rejected(format!(
                "unknown gateway order {}",
                claim.gateway_order_id
            )));
        }

        let expected = stub_signature(&claim.gateway_order_id, &claim.gateway_payment_id);
        if claim.signature != expected {
            return Err(PaymentBackendError::Rejected(
                "invalid payment signature".to_string(),
            ));
        }

        if state.verified.contains(&claim.gateway_payment_id) {
            return Err(PaymentBackendError::Rejected(
                "payment already consumed".to_string(),
            ));
        }

        state.verified.push(claim.gateway_payment_id.clone());
        Ok(())
    }

    async fn log_failure(&self, report: &GatewayFailureReport) -> Result<(), PaymentBackendError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_log {
            return Err(PaymentBackendError::Network(
                "failure log endpoint unreachable".to_string(),
            ));
        }

        state.failure_reports.push(report.clone());
        Ok(())
    }
}
