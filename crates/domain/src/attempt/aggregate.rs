//! Checkout attempt aggregate implementation.

use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{
    AttemptError, AttemptEvent, BuyerId, CheckoutStep, Money, PaymentPhase, PriceSummary,
    ShippingAddress,
    events::{AddressConfirmedData, AttemptStartedData, GatewayOpenedData},
};

/// Checkout attempt aggregate root.
///
/// Owns the wizard position, the payment phase, and the frozen shipping
/// address for the duration of one attempt. Cart lines are borrowed
/// read-only from the cart service and never stored here; payment intents
/// live only for the span between intent creation and the gateway outcome,
/// so only the gateway order id is kept for reconciling callbacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutAttempt {
    /// Unique attempt identifier.
    id: Option<AggregateId>,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    /// The buyer checking out.
    buyer_id: Option<BuyerId>,

    /// Wizard position.
    step: CheckoutStep,

    /// Payment phase.
    phase: PaymentPhase,

    /// Frozen shipping address, set when the wizard advances to payment.
    address: Option<ShippingAddress>,

    /// Price breakdown recorded when the address was confirmed.
    summary: Option<PriceSummary>,

    /// Gateway order id of the currently open (or last settled) intent.
    gateway_order_id: Option<String>,

    /// Canonical amount of the currently open (or last settled) intent.
    charged_amount: Option<Money>,

    /// Gateway payment id once the gateway reported success.
    gateway_payment_id: Option<String>,

    /// Reference of the persisted order, after finalization.
    order_ref: Option<String>,

    /// Most recent failure reason, if any.
    last_failure: Option<String>,
}

impl Aggregate for CheckoutAttempt {
    type Event = AttemptEvent;
    type Error = AttemptError;

    fn aggregate_type() -> &'static str {
        "CheckoutAttempt"
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
            AttemptEvent::AttemptStarted(data) => self.apply_started(data),
            AttemptEvent::AddressConfirmed(data) => self.apply_address_confirmed(data),
            AttemptEvent::ReturnedToAddress(_) => {
                // The confirmed address and summary are retained so a retry
                // keeps the same address.
                self.step = CheckoutStep::Address;
            }
            AttemptEvent::PaymentInitiated(_) => {
                self.phase = PaymentPhase::Initiating;
            }
            AttemptEvent::GatewayOpened(data) => self.apply_gateway_opened(data),
            AttemptEvent::GatewayFailed(data) => {
                self.phase = PaymentPhase::Idle;
                self.gateway_order_id = None;
                self.charged_amount = None;
                self.last_failure = Some(data.reason);
            }
            AttemptEvent::GatewayDismissed(_) => {
                self.phase = PaymentPhase::Idle;
                self.gateway_order_id = None;
                self.charged_amount = None;
            }
            AttemptEvent::PaymentAborted(data) => {
                self.phase = PaymentPhase::Idle;
                self.gateway_order_id = None;
                self.charged_amount = None;
                self.last_failure = Some(data.reason);
            }
            AttemptEvent::VerificationStarted(data) => {
                self.phase = PaymentPhase::Verifying;
                self.gateway_payment_id = Some(data.gateway_payment_id);
            }
            AttemptEvent::PaymentSettled(data) => {
                self.phase = PaymentPhase::Settled;
                self.gateway_payment_id = Some(data.gateway_payment_id);
            }
            AttemptEvent::VerificationRejected(data) => {
                self.phase = PaymentPhase::VerifyFailed;
                self.last_failure = Some(data.reason);
            }
            AttemptEvent::OrderPlaced(data) => {
                self.order_ref = Some(data.order_ref);
            }
            AttemptEvent::OrderPlacementFailed(data) => {
                // Phase stays Settled: the money has moved even though no
                // order record exists yet.
                self.last_failure = Some(data.reason);
            }
        }
    }
}

// Query methods
impl CheckoutAttempt {
    /// Returns the buyer ID.
    pub fn buyer_id(&self) -> Option<BuyerId> {
        self.buyer_id
    }

    /// Returns the wizard position.
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Returns the payment phase.
    pub fn phase(&self) -> PaymentPhase {
        self.phase
    }

    /// Returns the frozen shipping address, if confirmed.
    pub fn address(&self) -> Option<&ShippingAddress> {
        self.address.as_ref()
    }

    /// Returns the price breakdown recorded at address confirmation.
    pub fn summary(&self) -> Option<PriceSummary> {
        self.summary
    }

    /// Returns the gateway order id of the open intent, if any.
    pub fn gateway_order_id(&self) -> Option<&str> {
        self.gateway_order_id.as_deref()
    }

    /// Returns the canonical amount of the open (or settled) intent.
    pub fn charged_amount(&self) -> Option<Money> {
        self.charged_amount
    }

    /// Returns the gateway payment id, once reported.
    pub fn gateway_payment_id(&self) -> Option<&str> {
        self.gateway_payment_id.as_deref()
    }

    /// Returns the persisted order reference, after finalization.
    pub fn order_ref(&self) -> Option<&str> {
        self.order_ref.as_deref()
    }

    /// Returns true while a payment is in flight.
    ///
    /// Covers the whole span from the pay click to the first settled,
    /// failed, cancelled, or aborted outcome.
    pub fn processing_payment(&self) -> bool {
        self.phase.is_processing()
    }

    /// Returns true once the payment has settled.
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, PaymentPhase::Settled)
    }

    /// Returns the most recent failure reason, if any.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }
}

// Command methods (return events)
impl CheckoutAttempt {
    /// Starts a new checkout attempt for a buyer.
    pub fn start(
        &self,
        attempt_id: AggregateId,
        buyer_id: BuyerId,
    ) -> Result<Vec<AttemptEvent>, AttemptError> {
        if self.id.is_some() {
            return Err(AttemptError::AlreadyStarted);
        }

        Ok(vec![AttemptEvent::attempt_started(attempt_id, buyer_id)])
    }

    /// Confirms the shipping address and advances the wizard to payment.
    ///
    /// Refused when the cart is empty; the address must already have passed
    /// form validation (only a validated `ShippingAddress` can exist).
    pub fn confirm_address(
        &self,
        address: ShippingAddress,
        summary: PriceSummary,
        item_count: usize,
    ) -> Result<Vec<AttemptEvent>, AttemptError> {
        self.require_started()?;

        if !self.step.can_confirm_address() {
            return Err(AttemptError::InvalidStep {
                current: self.step,
                action: "confirm address",
            });
        }

        if item_count == 0 {
            return Err(AttemptError::EmptyCart);
        }

        Ok(vec![AttemptEvent::address_confirmed(
            address, summary, item_count,
        )])
    }

    /// Goes back from the payment step to the address step.
    ///
    /// Refused while a payment is in flight or after the attempt reached a
    /// terminal phase.
    pub fn return_to_address(&self) -> Result<Vec<AttemptEvent>, AttemptError> {
        self.require_started()?;

        if !self.step.can_return_to_address() {
            return Err(AttemptError::InvalidStep {
                current: self.step,
                action: "go back",
            });
        }

        if self.phase != PaymentPhase::Idle {
            return Err(AttemptError::InvalidPhase {
                current: self.phase,
                action: "go back",
            });
        }

        Ok(vec![AttemptEvent::returned_to_address()])
    }

    /// Begins a payment.
    ///
    /// This is the re-entrancy guard: a second pay click while a payment is
    /// in flight (or after a terminal outcome) is rejected here.
    pub fn begin_payment(&self) -> Result<Vec<AttemptEvent>, AttemptError> {
        self.require_started()?;

        if self.step != CheckoutStep::Payment {
            return Err(AttemptError::InvalidStep {
                current: self.step,
                action: "begin payment",
            });
        }

        if !self.phase.can_initiate() {
            return Err(AttemptError::InvalidPhase {
                current: self.phase,
                action: "begin payment",
            });
        }

        Ok(vec![AttemptEvent::payment_initiated()])
    }

    /// Records that the gateway widget was opened with a fresh intent.
    pub fn open_gateway(
        &self,
        gateway_order_id: impl Into<String>,
        amount: Money,
        currency: impl Into<String>,
    ) -> Result<Vec<AttemptEvent>, AttemptError> {
        if self.phase != PaymentPhase::Initiating {
            return Err(AttemptError::InvalidPhase {
                current: self.phase,
                action: "open gateway",
            });
        }

        Ok(vec![AttemptEvent::gateway_opened(
            gateway_order_id,
            amount,
            currency,
        )])
    }

    /// Records a gateway-reported payment failure; the phase returns to
    /// idle so the buyer may retry with a fresh intent.
    pub fn record_gateway_failure(
        &self,
        reason: impl Into<String>,
        gateway_order_id: Option<String>,
        gateway_payment_id: Option<String>,
    ) -> Result<Vec<AttemptEvent>, AttemptError> {
        if self.phase != PaymentPhase::AwaitingGateway {
            return Err(AttemptError::InvalidPhase {
                current: self.phase,
                action: "record gateway failure",
            });
        }

        Ok(vec![AttemptEvent::gateway_failed(
            reason,
            gateway_order_id,
            gateway_payment_id,
        )])
    }

    /// Records that the buyer dismissed the gateway widget.
    pub fn record_gateway_dismissal(&self) -> Result<Vec<AttemptEvent>, AttemptError> {
        if self.phase != PaymentPhase::AwaitingGateway {
            return Err(AttemptError::InvalidPhase {
                current: self.phase,
                action: "record dismissal",
            });
        }

        Ok(vec![AttemptEvent::gateway_dismissed()])
    }

    /// Aborts a payment that never produced a gateway outcome
    /// (loader failure, intent rejection, configuration error, or an
    /// unexpected error while the widget was open).
    pub fn abort_payment(
        &self,
        reason: impl Into<String>,
    ) -> Result<Vec<AttemptEvent>, AttemptError> {
        if !self.phase.is_processing() {
            return Err(AttemptError::InvalidPhase {
                current: self.phase,
                action: "abort payment",
            });
        }

        Ok(vec![AttemptEvent::payment_aborted(reason)])
    }

    /// Begins backend verification of a gateway success callback.
    ///
    /// The callback's gateway order id is reconciled against the intent
    /// this attempt opened; a mismatch is rejected before any backend call.
    pub fn begin_verification(
        &self,
        claimed_gateway_order_id: &str,
        gateway_payment_id: impl Into<String>,
    ) -> Result<Vec<AttemptEvent>, AttemptError> {
        if self.phase != PaymentPhase::AwaitingGateway {
            return Err(AttemptError::InvalidPhase {
                current: self.phase,
                action: "begin verification",
            });
        }

        match self.gateway_order_id.as_deref() {
            Some(expected) if expected == claimed_gateway_order_id => {}
            Some(expected) => {
                return Err(AttemptError::MismatchedGatewayOrder {
                    expected: expected.to_string(),
                    got: claimed_gateway_order_id.to_string(),
                });
            }
            None => {
                return Err(AttemptError::MismatchedGatewayOrder {
                    expected: "<none>".to_string(),
                    got: claimed_gateway_order_id.to_string(),
                });
            }
        }

        Ok(vec![AttemptEvent::verification_started(gateway_payment_id)])
    }

    /// Settles the payment after successful backend verification.
    ///
    /// Appended before the order finalizer runs, so a duplicate success
    /// callback can never finalize twice.
    pub fn settle(
        &self,
        gateway_payment_id: impl Into<String>,
    ) -> Result<Vec<AttemptEvent>, AttemptError> {
        if self.phase != PaymentPhase::Verifying {
            return Err(AttemptError::InvalidPhase {
                current: self.phase,
                action: "settle",
            });
        }

        Ok(vec![AttemptEvent::payment_settled(gateway_payment_id)])
    }

    /// Records that the backend rejected verification.
    pub fn reject_verification(
        &self,
        reason: impl Into<String>,
    ) -> Result<Vec<AttemptEvent>, AttemptError> {
        if self.phase != PaymentPhase::Verifying {
            return Err(AttemptError::InvalidPhase {
                current: self.phase,
                action: "reject verification",
            });
        }

        Ok(vec![AttemptEvent::verification_rejected(reason)])
    }

    /// Records the persisted order after finalization.
    pub fn record_order_placed(
        &self,
        order_ref: impl Into<String>,
    ) -> Result<Vec<AttemptEvent>, AttemptError> {
        if self.phase != PaymentPhase::Settled {
            return Err(AttemptError::InvalidPhase {
                current: self.phase,
                action: "record order",
            });
        }

        if self.order_ref.is_some() {
            return Err(AttemptError::OrderAlreadyPlaced);
        }

        Ok(vec![AttemptEvent::order_placed(order_ref)])
    }

    /// Records that order placement failed after the payment settled.
    pub fn record_order_placement_failure(
        &self,
        reason: impl Into<String>,
    ) -> Result<Vec<AttemptEvent>, AttemptError> {
        if self.phase != PaymentPhase::Settled {
            return Err(AttemptError::InvalidPhase {
                current: self.phase,
                action: "record placement failure",
            });
        }

        if self.order_ref.is_some() {
            return Err(AttemptError::OrderAlreadyPlaced);
        }

        Ok(vec![AttemptEvent::order_placement_failed(reason)])
    }

    fn require_started(&self) -> Result<(), AttemptError> {
        if self.id.is_none() {
            return Err(AttemptError::NotStarted);
        }
        Ok(())
    }
}

// Apply event helpers
impl CheckoutAttempt {
    fn apply_started(&mut self, data: AttemptStartedData) {
        self.id = Some(data.attempt_id);
        self.buyer_id = Some(data.buyer_id);
        self.step = CheckoutStep::Address;
        self.phase = PaymentPhase::Idle;
    }

    fn apply_address_confirmed(&mut self, data: AddressConfirmedData) {
        self.address = Some(data.address);
        self.summary = Some(data.summary);
        self.step = CheckoutStep::Payment;
    }

    fn apply_gateway_opened(&mut self, data: GatewayOpenedData) {
        self.phase = PaymentPhase::AwaitingGateway;
        self.gateway_order_id = Some(data.gateway_order_id);
        self.charged_amount = Some(data.amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::{AddressForm, CartLine, Money, ShippingPolicy, price_cart};

    fn sample_address() -> ShippingAddress {
        let mut form = AddressForm::new();
        form.set_full_name("Asha Gond");
        form.set_phone("9876543210");
        form.set_address_line("12 Forest Lane");
        form.set_city("Bhopal");
        form.set_pincode("462001");
        form.validate().unwrap()
    }

    fn sample_summary() -> PriceSummary {
        let lines = vec![CartLine::new(
            "CRAFT-001",
            "Warli painting",
            2,
            Money::from_rupees(600),
        )];
        price_cart(&lines, &ShippingPolicy::default())
    }

    fn started_attempt() -> (CheckoutAttempt, AggregateId) {
        let mut attempt = CheckoutAttempt::default();
        let attempt_id = AggregateId::new();
        let buyer_id = BuyerId::new();
        let events = attempt.start(attempt_id, buyer_id).unwrap();
        attempt.apply_events(events);
        (attempt, attempt_id)
    }

    fn attempt_at_payment_step() -> CheckoutAttempt {
        let (mut attempt, _) = started_attempt();
        let events = attempt
            .confirm_address(sample_address(), sample_summary(), 1)
            .unwrap();
        attempt.apply_events(events);
        attempt
    }

    fn attempt_awaiting_gateway() -> CheckoutAttempt {
        let mut attempt = attempt_at_payment_step();
        attempt.apply_events(attempt.begin_payment().unwrap());
        attempt.apply_events(
            attempt
                .open_gateway("order_0001", Money::from_rupees(1200), "INR")
                .unwrap(),
        );
        attempt
    }

    #[test]
    fn start_attempt() {
        let (attempt, attempt_id) = started_attempt();
        assert_eq!(attempt.id(), Some(attempt_id));
        assert!(attempt.buyer_id().is_some());
        assert_eq!(attempt.step(), CheckoutStep::Address);
        assert_eq!(attempt.phase(), PaymentPhase::Idle);
        assert!(!attempt.processing_payment());
    }

    #[test]
    fn start_twice_fails() {
        let (attempt, _) = started_attempt();
        let result = attempt.start(AggregateId::new(), BuyerId::new());
        assert!(matches!(result, Err(AttemptError::AlreadyStarted)));
    }

    #[test]
    fn commands_before_start_fail() {
        let attempt = CheckoutAttempt::default();
        let result = attempt.confirm_address(sample_address(), sample_summary(), 1);
        assert!(matches!(result, Err(AttemptError::NotStarted)));
    }

    #[test]
    fn confirm_address_advances_to_payment() {
        let attempt = attempt_at_payment_step();
        assert_eq!(attempt.step(), CheckoutStep::Payment);
        assert_eq!(attempt.address().unwrap().pincode, "462001");
        assert_eq!(
            attempt.summary().unwrap().total,
            Money::from_rupees(1200)
        );
    }

    #[test]
    fn confirm_address_with_empty_cart_is_refused() {
        let (attempt, _) = started_attempt();
        let empty_summary = price_cart(&[], &ShippingPolicy::default());
        let result = attempt.confirm_address(sample_address(), empty_summary, 0);
        assert!(matches!(result, Err(AttemptError::EmptyCart)));
    }

    #[test]
    fn confirm_address_twice_is_refused() {
        let attempt = attempt_at_payment_step();
        let result = attempt.confirm_address(sample_address(), sample_summary(), 1);
        assert!(matches!(result, Err(AttemptError::InvalidStep { .. })));
    }

    #[test]
    fn back_keeps_address_and_summary() {
        let mut attempt = attempt_at_payment_step();
        attempt.apply_events(attempt.return_to_address().unwrap());

        assert_eq!(attempt.step(), CheckoutStep::Address);
        assert!(attempt.address().is_some());
        assert!(attempt.summary().is_some());
    }

    #[test]
    fn back_from_address_step_is_refused() {
        let (attempt, _) = started_attempt();
        let result = attempt.return_to_address();
        assert!(matches!(result, Err(AttemptError::InvalidStep { .. })));
    }

    #[test]
    fn back_while_processing_is_refused() {
        let mut attempt = attempt_at_payment_step();
        attempt.apply_events(attempt.begin_payment().unwrap());
        let result = attempt.return_to_address();
        assert!(matches!(result, Err(AttemptError::InvalidPhase { .. })));
    }

    #[test]
    fn begin_payment_from_address_step_is_refused() {
        let (attempt, _) = started_attempt();
        let result = attempt.begin_payment();
        assert!(matches!(result, Err(AttemptError::InvalidStep { .. })));
    }

    #[test]
    fn second_begin_payment_is_refused_while_processing() {
        let mut attempt = attempt_at_payment_step();
        attempt.apply_events(attempt.begin_payment().unwrap());
        assert!(attempt.processing_payment());

        let result = attempt.begin_payment();
        assert!(matches!(result, Err(AttemptError::InvalidPhase { .. })));
    }

    #[test]
    fn gateway_failure_returns_to_idle_and_allows_retry() {
        let mut attempt = attempt_awaiting_gateway();
        attempt.apply_events(
            attempt
                .record_gateway_failure("card declined", Some("order_0001".into()), None)
                .unwrap(),
        );

        assert_eq!(attempt.phase(), PaymentPhase::Idle);
        assert!(!attempt.processing_payment());
        assert_eq!(attempt.last_failure(), Some("card declined"));
        assert!(attempt.gateway_order_id().is_none());
        // Retry is a fresh initiation
        assert!(attempt.begin_payment().is_ok());
    }

    #[test]
    fn dismissal_returns_to_idle() {
        let mut attempt = attempt_awaiting_gateway();
        attempt.apply_events(attempt.record_gateway_dismissal().unwrap());

        assert_eq!(attempt.phase(), PaymentPhase::Idle);
        assert!(attempt.begin_payment().is_ok());
    }

    #[test]
    fn abort_clears_processing_from_initiating() {
        let mut attempt = attempt_at_payment_step();
        attempt.apply_events(attempt.begin_payment().unwrap());
        attempt.apply_events(attempt.abort_payment("gateway unavailable").unwrap());

        assert_eq!(attempt.phase(), PaymentPhase::Idle);
        assert!(!attempt.processing_payment());
    }

    #[test]
    fn abort_is_refused_when_idle() {
        let attempt = attempt_at_payment_step();
        let result = attempt.abort_payment("nothing in flight");
        assert!(matches!(result, Err(AttemptError::InvalidPhase { .. })));
    }

    #[test]
    fn verification_requires_matching_gateway_order() {
        let attempt = attempt_awaiting_gateway();
        let result = attempt.begin_verification("order_9999", "pay_0001");
        assert!(matches!(
            result,
            Err(AttemptError::MismatchedGatewayOrder { .. })
        ));
    }

    #[test]
    fn settle_only_from_verifying() {
        let attempt = attempt_awaiting_gateway();
        // Straight from the gateway callback, without verification
        let result = attempt.settle("pay_0001");
        assert!(matches!(result, Err(AttemptError::InvalidPhase { .. })));
    }

    #[test]
    fn full_settlement_lifecycle() {
        let mut attempt = attempt_awaiting_gateway();
        assert_eq!(attempt.charged_amount(), Some(Money::from_rupees(1200)));

        attempt.apply_events(attempt.begin_verification("order_0001", "pay_0001").unwrap());
        assert_eq!(attempt.phase(), PaymentPhase::Verifying);
        assert!(attempt.processing_payment());

        attempt.apply_events(attempt.settle("pay_0001").unwrap());
        assert_eq!(attempt.phase(), PaymentPhase::Settled);
        assert!(attempt.is_settled());
        assert!(!attempt.processing_payment());

        attempt.apply_events(attempt.record_order_placed("ORD-0001").unwrap());
        assert_eq!(attempt.order_ref(), Some("ORD-0001"));
    }

    #[test]
    fn settle_twice_is_refused() {
        let mut attempt = attempt_awaiting_gateway();
        attempt.apply_events(attempt.begin_verification("order_0001", "pay_0001").unwrap());
        attempt.apply_events(attempt.settle("pay_0001").unwrap());

        let result = attempt.settle("pay_0001");
        assert!(matches!(result, Err(AttemptError::InvalidPhase { .. })));
    }

    #[test]
    fn duplicate_success_callback_cannot_reverify() {
        let mut attempt = attempt_awaiting_gateway();
        attempt.apply_events(attempt.begin_verification("order_0001", "pay_0001").unwrap());
        attempt.apply_events(attempt.settle("pay_0001").unwrap());

        // The gateway fires success again for the same transaction
        let result = attempt.begin_verification("order_0001", "pay_0001");
        assert!(matches!(result, Err(AttemptError::InvalidPhase { .. })));
    }

    #[test]
    fn order_placed_twice_is_refused() {
        let mut attempt = attempt_awaiting_gateway();
        attempt.apply_events(attempt.begin_verification("order_0001", "pay_0001").unwrap());
        attempt.apply_events(attempt.settle("pay_0001").unwrap());
        attempt.apply_events(attempt.record_order_placed("ORD-0001").unwrap());

        let result = attempt.record_order_placed("ORD-0002");
        assert!(matches!(result, Err(AttemptError::OrderAlreadyPlaced)));
    }

    #[test]
    fn verification_rejection_is_terminal() {
        let mut attempt = attempt_awaiting_gateway();
        attempt.apply_events(attempt.begin_verification("order_0001", "pay_0001").unwrap());
        attempt.apply_events(attempt.reject_verification("invalid signature").unwrap());

        assert_eq!(attempt.phase(), PaymentPhase::VerifyFailed);
        assert!(!attempt.processing_payment());
        assert_eq!(attempt.last_failure(), Some("invalid signature"));
        // No retry from a terminal phase
        assert!(matches!(
            attempt.begin_payment(),
            Err(AttemptError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn placement_failure_keeps_settled_phase() {
        let mut attempt = attempt_awaiting_gateway();
        attempt.apply_events(attempt.begin_verification("order_0001", "pay_0001").unwrap());
        attempt.apply_events(attempt.settle("pay_0001").unwrap());
        attempt.apply_events(
            attempt
                .record_order_placement_failure("order service down")
                .unwrap(),
        );

        assert!(attempt.is_settled());
        assert!(attempt.order_ref().is_none());
        assert_eq!(attempt.last_failure(), Some("order service down"));
    }

    #[test]
    fn serialization_roundtrip() {
        let attempt = attempt_awaiting_gateway();
        let json = serde_json::to_string(&attempt).unwrap();
        let back: CheckoutAttempt = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id(), attempt.id());
        assert_eq!(back.step(), CheckoutStep::Payment);
        assert_eq!(back.phase(), PaymentPhase::AwaitingGateway);
        assert_eq!(back.gateway_order_id(), Some("order_0001"));
    }
}
