//! Checkout coordinator: drives one attempt from address entry to
//! settlement or recovery.

use std::time::Instant;

use common::AggregateId;
use domain::{
    AbortPayment, AddressForm, AttemptError, AttemptService, BeginPayment, BeginVerification,
    BuyerId, CartLine, CheckoutAttempt, ConfirmAddress, DomainError, PaymentPhase, PriceSummary,
    RecordGatewayDismissal, RecordGatewayFailure, RecordOrderPlaced, RecordOrderPlacementFailure,
    RejectVerification, ReturnToAddress, SettlePayment, ShippingPolicy, StartAttempt, price_cart,
};
use event_store::EventStore;

use crate::error::CheckoutError;
use crate::gateway::{CustomerPrefill, GatewayClient, GatewayLoader, GatewayProvider, PaymentOutcome};
use crate::services::{
    CartService, GatewayFailureReport, OrderBackend, PaymentBackend, VerificationClaim,
};

/// Whether the deployment charges against sandbox or live credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayMode {
    /// Sandbox: the intent's key id must carry the test prefix.
    #[default]
    Sandbox,

    /// Live: no key prefix check.
    Live,
}

/// Gateway environment settings.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Deployment mode.
    pub mode: GatewayMode,

    /// Expected key prefix in sandbox mode.
    pub test_key_prefix: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            mode: GatewayMode::Sandbox,
            test_key_prefix: "rzp_test_".to_string(),
        }
    }
}

/// Caller-facing result of a payment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentResolution {
    /// Verified, finalized, cart cleared.
    Settled { order_ref: String },

    /// The gateway declined the payment; the buyer may retry.
    Declined { reason: String },

    /// The buyer dismissed the widget; the buyer may retry.
    Cancelled,

    /// A duplicate or stale gateway outcome arrived after the attempt had
    /// already been resolved; nothing was done.
    AlreadyResolved,
}

/// Orchestrates checkout attempts over the external collaborators.
///
/// Within one attempt the steps are strictly ordered: gateway script before
/// intent creation, intent before widget open, gateway success before
/// verification, verification before finalization. Each retry is an
/// independent, freshly created intent; only the already-validated shipping
/// address carries across.
pub struct CheckoutCoordinator<S, C, P, G, O>
where
    S: EventStore,
    C: CartService,
    P: PaymentBackend,
    G: GatewayProvider,
    O: OrderBackend,
{
    attempts: AttemptService<S>,
    carts: C,
    backend: P,
    loader: GatewayLoader<G>,
    orders: O,
    policy: ShippingPolicy,
    settings: GatewaySettings,
}

impl<S, C, P, G, O> CheckoutCoordinator<S, C, P, G, O>
where
    S: EventStore,
    C: CartService,
    P: PaymentBackend,
    G: GatewayProvider,
    O: OrderBackend,
{
    /// Creates a new checkout coordinator.
    pub fn new(
        store: S,
        carts: C,
        backend: P,
        gateway: G,
        orders: O,
        policy: ShippingPolicy,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            attempts: AttemptService::new(store),
            carts,
            backend,
            loader: GatewayLoader::new(gateway),
            orders,
            policy,
            settings,
        }
    }

    /// Returns the active shipping policy.
    pub fn shipping_policy(&self) -> &ShippingPolicy {
        &self.policy
    }

    /// Starts a new checkout attempt for a buyer.
    #[tracing::instrument(skip(self))]
    pub async fn start_attempt(&self, buyer_id: BuyerId) -> Result<CheckoutAttempt, CheckoutError> {
        let cmd = StartAttempt::for_buyer(buyer_id);
        let result = self.attempts.start(cmd).await?;
        Ok(result.aggregate)
    }

    /// Loads an attempt.
    pub async fn get_attempt(
        &self,
        attempt_id: AggregateId,
    ) -> Result<CheckoutAttempt, CheckoutError> {
        self.attempts
            .get_attempt(attempt_id)
            .await?
            .ok_or(CheckoutError::AttemptNotFound(attempt_id))
    }

    /// Confirms the shipping address and advances the wizard to payment.
    ///
    /// Refused with a field-by-field error when validation fails, and with
    /// [`CheckoutError::EmptyCart`] when there is nothing to buy; either
    /// way the attempt stays on the address step.
    #[tracing::instrument(skip(self, form))]
    pub async fn confirm_address(
        &self,
        attempt_id: AggregateId,
        form: &AddressForm,
    ) -> Result<CheckoutAttempt, CheckoutError> {
        let attempt = self.get_attempt(attempt_id).await?;
        let buyer_id = self.buyer_of(&attempt, attempt_id)?;

        let (lines, summary) = self.priced_cart(buyer_id).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let address = form.validate()?;

        let result = self
            .attempts
            .confirm_address(ConfirmAddress::new(attempt_id, address, summary, lines.len()))
            .await?;
        Ok(result.aggregate)
    }

    /// Goes back from the payment step to the address step.
    #[tracing::instrument(skip(self))]
    pub async fn return_to_address(
        &self,
        attempt_id: AggregateId,
    ) -> Result<CheckoutAttempt, CheckoutError> {
        let result = self
            .attempts
            .return_to_address(ReturnToAddress::new(attempt_id))
            .await?;
        Ok(result.aggregate)
    }

    /// Runs one payment attempt end to end.
    ///
    /// A second call while a payment is in flight is refused without side
    /// effects. Every pre-gateway failure aborts the payment so the buyer
    /// can retry by clicking again.
    #[tracing::instrument(skip(self))]
    pub async fn pay(&self, attempt_id: AggregateId) -> Result<PaymentResolution, CheckoutError> {
        let attempt = self.get_attempt(attempt_id).await?;
        let buyer_id = self.buyer_of(&attempt, attempt_id)?;

        if attempt.processing_payment() {
            return Err(CheckoutError::PaymentInProgress);
        }

        self.attempts
            .begin_payment(BeginPayment::new(attempt_id))
            .await?;
        metrics::counter!("checkout_payments_started_total").increment(1);
        let pay_started = Instant::now();

        // 1. A fresh gateway client, never a stale one
        let client = match self.loader.ensure_loaded().await {
            Ok(client) => client,
            Err(e) => {
                self.abort(attempt_id, "payment gateway unavailable").await?;
                metrics::counter!("checkout_gateway_unavailable_total").increment(1);
                return Err(e);
            }
        };

        // 2. Price the cart as it stands right now
        let (lines, summary) = match self.priced_cart(buyer_id).await {
            Ok(priced) => priced,
            Err(e) => {
                self.abort(attempt_id, "cart unavailable").await?;
                return Err(e);
            }
        };
        if lines.is_empty() {
            self.abort(attempt_id, "cart is empty").await?;
            return Err(CheckoutError::EmptyCart);
        }

        // 3. Backend intent; its amount is the one that gets charged
        let intent = match self.backend.create_intent(buyer_id, summary.total).await {
            Ok(intent) => intent,
            Err(e) => {
                self.abort(attempt_id, e.to_string()).await?;
                return Err(e.into());
            }
        };

        // 4. Refuse to open the widget against unexpected credentials
        if self.settings.mode == GatewayMode::Sandbox
            && !intent.key_id.starts_with(&self.settings.test_key_prefix)
        {
            self.abort(attempt_id, "gateway key misconfigured").await?;
            metrics::counter!("checkout_config_errors_total").increment(1);
            tracing::error!(key_id = %intent.key_id, "non-sandbox key returned in sandbox mode");
            return Err(CheckoutError::MisconfiguredGateway {
                key_id: intent.key_id,
            });
        }

        // 5. Open the widget, prefilled from the frozen address
        let prefill = match attempt.address() {
            Some(address) => CustomerPrefill::from_address(address),
            None => {
                self.abort(attempt_id, "no shipping address on attempt").await?;
                return Err(CheckoutError::Gateway(
                    "attempt has no shipping address".to_string(),
                ));
            }
        };

        self.attempts
            .open_gateway(domain::OpenGateway::new(
                attempt_id,
                intent.gateway_order_id.clone(),
                intent.amount,
                intent.currency.clone(),
            ))
            .await?;

        let outcome = match client.collect_payment(&intent, prefill).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Unexpected widget error: clear the in-flight payment so
                // the buyer is never blocked from retrying.
                self.abort(attempt_id, "gateway widget error").await?;
                return Err(e);
            }
        };

        let resolution = self.resolve_outcome(attempt_id, outcome).await;
        metrics::histogram!("checkout_payment_duration_seconds")
            .record(pay_started.elapsed().as_secs_f64());
        resolution
    }

    /// Reconciles one gateway outcome against the attempt.
    ///
    /// Consumed exactly once: an outcome that arrives after the attempt
    /// already left the awaiting-gateway phase (a duplicate success event,
    /// for instance) resolves to [`PaymentResolution::AlreadyResolved`]
    /// without touching any collaborator.
    #[tracing::instrument(skip(self, outcome))]
    pub async fn resolve_outcome(
        &self,
        attempt_id: AggregateId,
        outcome: PaymentOutcome,
    ) -> Result<PaymentResolution, CheckoutError> {
        let attempt = self.get_attempt(attempt_id).await?;

        if attempt.phase() != PaymentPhase::AwaitingGateway {
            tracing::warn!(
                %attempt_id,
                phase = %attempt.phase(),
                "duplicate or stale gateway outcome ignored"
            );
            return Ok(PaymentResolution::AlreadyResolved);
        }

        let buyer_id = self.buyer_of(&attempt, attempt_id)?;

        match outcome {
            PaymentOutcome::Success {
                gateway_order_id,
                gateway_payment_id,
                signature,
            } => {
                // Reconcile the callback against the order this attempt
                // opened before trusting anything in it.
                if let Err(e) = self
                    .attempts
                    .begin_verification(BeginVerification::new(
                        attempt_id,
                        gateway_order_id.clone(),
                        gateway_payment_id.clone(),
                    ))
                    .await
                {
                    return self.reject_mismatched_callback(attempt_id, e).await;
                }

                let claim = VerificationClaim {
                    gateway_order_id,
                    gateway_payment_id: gateway_payment_id.clone(),
                    signature,
                };

                match self.backend.verify_payment(&claim).await {
                    Ok(()) => {
                        // Settled before the finalizer runs, so at most one
                        // finalization can ever happen for this attempt.
                        self.attempts
                            .settle(SettlePayment::new(attempt_id, gateway_payment_id))
                            .await?;
                        metrics::counter!("checkout_payments_settled_total").increment(1);
                        self.finalize(attempt_id, buyer_id).await
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        self.attempts
                            .reject_verification(RejectVerification::new(
                                attempt_id,
                                reason.clone(),
                            ))
                            .await?;
                        metrics::counter!("checkout_verification_failures_total").increment(1);
                        tracing::error!(%attempt_id, %reason, "payment verification rejected");
                        Err(CheckoutError::VerificationFailed { reason })
                    }
                }
            }
            PaymentOutcome::Failure {
                gateway_order_id,
                gateway_payment_id,
                reason,
            } => {
                self.attempts
                    .record_gateway_failure(RecordGatewayFailure::new(
                        attempt_id,
                        reason.clone(),
                        gateway_order_id.clone(),
                        gateway_payment_id.clone(),
                    ))
                    .await?;

                // Best-effort: a logging failure must never block showing
                // the buyer their payment failed.
                let report = GatewayFailureReport {
                    gateway_order_id,
                    gateway_payment_id,
                    reason: reason.clone(),
                };
                if let Err(log_err) = self.backend.log_failure(&report).await {
                    tracing::warn!(error = %log_err, "gateway failure logging failed");
                }

                metrics::counter!("checkout_gateway_failures_total").increment(1);
                Ok(PaymentResolution::Declined { reason })
            }
            PaymentOutcome::Cancelled => {
                // User-initiated dismissal: no failure-logging call.
                self.attempts
                    .record_gateway_dismissal(RecordGatewayDismissal::new(attempt_id))
                    .await?;
                metrics::counter!("checkout_payments_cancelled_total").increment(1);
                Ok(PaymentResolution::Cancelled)
            }
        }
    }

    async fn finalize(
        &self,
        attempt_id: AggregateId,
        buyer_id: BuyerId,
    ) -> Result<PaymentResolution, CheckoutError> {
        let attempt = self.get_attempt(attempt_id).await?;
        let amount = attempt
            .charged_amount()
            .or_else(|| attempt.summary().map(|s| s.total))
            .unwrap_or_default();

        match self.orders.place_order(buyer_id, amount).await {
            Ok(record) => {
                if let Err(e) = self.carts.clear_cart(buyer_id).await {
                    // The order exists and money moved; a stale cart cache
                    // must not fail the purchase.
                    tracing::warn!(error = %e, "cart clear after order placement failed");
                }

                self.attempts
                    .record_order_placed(RecordOrderPlaced::new(
                        attempt_id,
                        record.order_ref.clone(),
                    ))
                    .await?;
                metrics::counter!("checkout_orders_placed_total").increment(1);
                tracing::info!(%attempt_id, order_ref = %record.order_ref, "checkout settled");

                Ok(PaymentResolution::Settled {
                    order_ref: record.order_ref,
                })
            }
            Err(e) => {
                let reason = match &e {
                    CheckoutError::OrderPlacementFailed { reason } => reason.clone(),
                    other => other.to_string(),
                };
                self.attempts
                    .record_order_placement_failure(RecordOrderPlacementFailure::new(
                        attempt_id,
                        reason.clone(),
                    ))
                    .await?;
                metrics::counter!("checkout_order_placement_failures_total").increment(1);
                tracing::error!(%attempt_id, %reason, "order placement failed after settled payment");

                Err(CheckoutError::OrderPlacementFailed { reason })
            }
        }
    }

    async fn reject_mismatched_callback(
        &self,
        attempt_id: AggregateId,
        error: DomainError,
    ) -> Result<PaymentResolution, CheckoutError> {
        match error {
            DomainError::Attempt(AttemptError::MismatchedGatewayOrder { expected, got }) => {
                let reason = format!("gateway order mismatch: expected {expected}, got {got}");
                self.abort(attempt_id, reason.clone()).await?;
                metrics::counter!("checkout_verification_failures_total").increment(1);
                tracing::error!(%attempt_id, %reason, "success callback failed reconciliation");
                Err(CheckoutError::VerificationFailed { reason })
            }
            other => Err(other.into()),
        }
    }

    async fn abort(
        &self,
        attempt_id: AggregateId,
        reason: impl Into<String>,
    ) -> Result<(), CheckoutError> {
        self.attempts
            .abort_payment(AbortPayment::new(attempt_id, reason))
            .await?;
        Ok(())
    }

    async fn priced_cart(
        &self,
        buyer_id: BuyerId,
    ) -> Result<(Vec<CartLine>, PriceSummary), CheckoutError> {
        let lines = self.carts.get_cart(buyer_id).await?;
        let summary = price_cart(&lines, &self.policy);
        Ok((lines, summary))
    }

    fn buyer_of(
        &self,
        attempt: &CheckoutAttempt,
        attempt_id: AggregateId,
    ) -> Result<BuyerId, CheckoutError> {
        attempt
            .buyer_id()
            .ok_or(CheckoutError::AttemptNotFound(attempt_id))
    }
}
