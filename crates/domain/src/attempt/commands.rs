//! Checkout attempt commands.

use common::AggregateId;

use crate::command::Command;

use super::{BuyerId, CheckoutAttempt, Money, PriceSummary, ShippingAddress};

/// Command to start a new checkout attempt.
#[derive(Debug, Clone)]
pub struct StartAttempt {
    /// The attempt ID to create.
    pub attempt_id: AggregateId,

    /// The buyer checking out.
    pub buyer_id: BuyerId,
}

impl StartAttempt {
    /// Creates a new StartAttempt command.
    pub fn new(attempt_id: AggregateId, buyer_id: BuyerId) -> Self {
        Self {
            attempt_id,
            buyer_id,
        }
    }

    /// Creates a new StartAttempt command with a generated attempt ID.
    pub fn for_buyer(buyer_id: BuyerId) -> Self {
        Self {
            attempt_id: AggregateId::new(),
            buyer_id,
        }
    }
}

impl Command for StartAttempt {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}

/// Command to confirm the shipping address and advance to payment.
#[derive(Debug, Clone)]
pub struct ConfirmAddress {
    /// The attempt being advanced.
    pub attempt_id: AggregateId,

    /// The validated shipping address.
    pub address: ShippingAddress,

    /// Price breakdown of the cart at confirmation time.
    pub summary: PriceSummary,

    /// Number of cart lines at confirmation time.
    pub item_count: usize,
}

impl ConfirmAddress {
    /// Creates a new ConfirmAddress command.
    pub fn new(
        attempt_id: AggregateId,
        address: ShippingAddress,
        summary: PriceSummary,
        item_count: usize,
    ) -> Self {
        Self {
            attempt_id,
            address,
            summary,
            item_count,
        }
    }
}

impl Command for ConfirmAddress {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}

/// Command to go back from the payment step to the address step.
#[derive(Debug, Clone)]
pub struct ReturnToAddress {
    /// The attempt going back.
    pub attempt_id: AggregateId,
}

impl ReturnToAddress {
    /// Creates a new ReturnToAddress command.
    pub fn new(attempt_id: AggregateId) -> Self {
        Self { attempt_id }
    }
}

impl Command for ReturnToAddress {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}

/// Command to begin a payment.
#[derive(Debug, Clone)]
pub struct BeginPayment {
    /// The attempt paying.
    pub attempt_id: AggregateId,
}

impl BeginPayment {
    /// Creates a new BeginPayment command.
    pub fn new(attempt_id: AggregateId) -> Self {
        Self { attempt_id }
    }
}

impl Command for BeginPayment {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}

/// Command to record that the gateway widget was opened.
#[derive(Debug, Clone)]
pub struct OpenGateway {
    /// The attempt whose widget opened.
    pub attempt_id: AggregateId,

    /// Gateway-scoped order id from the payment intent.
    pub gateway_order_id: String,

    /// Canonical amount being charged.
    pub amount: Money,

    /// Charge currency.
    pub currency: String,
}

impl OpenGateway {
    /// Creates a new OpenGateway command.
    pub fn new(
        attempt_id: AggregateId,
        gateway_order_id: impl Into<String>,
        amount: Money,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            attempt_id,
            gateway_order_id: gateway_order_id.into(),
            amount,
            currency: currency.into(),
        }
    }
}

impl Command for OpenGateway {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}

/// Command to record a gateway-reported payment failure.
#[derive(Debug, Clone)]
pub struct RecordGatewayFailure {
    /// The attempt whose payment failed.
    pub attempt_id: AggregateId,

    /// Gateway-provided failure reason.
    pub reason: String,

    /// Gateway order id, if reported.
    pub gateway_order_id: Option<String>,

    /// Gateway payment id, if reported.
    pub gateway_payment_id: Option<String>,
}

impl RecordGatewayFailure {
    /// Creates a new RecordGatewayFailure command.
    pub fn new(
        attempt_id: AggregateId,
        reason: impl Into<String>,
        gateway_order_id: Option<String>,
        gateway_payment_id: Option<String>,
    ) -> Self {
        Self {
            attempt_id,
            reason: reason.into(),
            gateway_order_id,
            gateway_payment_id,
        }
    }
}

impl Command for RecordGatewayFailure {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}

/// Command to record that the buyer dismissed the gateway widget.
#[derive(Debug, Clone)]
pub struct RecordGatewayDismissal {
    /// The attempt whose widget was dismissed.
    pub attempt_id: AggregateId,
}

impl RecordGatewayDismissal {
    /// Creates a new RecordGatewayDismissal command.
    pub fn new(attempt_id: AggregateId) -> Self {
        Self { attempt_id }
    }
}

impl Command for RecordGatewayDismissal {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}

/// Command to abort a payment that produced no gateway outcome.
#[derive(Debug, Clone)]
pub struct AbortPayment {
    /// The attempt being aborted.
    pub attempt_id: AggregateId,

    /// Why the payment was aborted.
    pub reason: String,
}

impl AbortPayment {
    /// Creates a new AbortPayment command.
    pub fn new(attempt_id: AggregateId, reason: impl Into<String>) -> Self {
        Self {
            attempt_id,
            reason: reason.into(),
        }
    }
}

impl Command for AbortPayment {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}

/// Command to begin backend verification of a gateway success callback.
#[derive(Debug, Clone)]
pub struct BeginVerification {
    /// The attempt being verified.
    pub attempt_id: AggregateId,

    /// Gateway order id from the success callback.
    pub gateway_order_id: String,

    /// Gateway payment id from the success callback.
    pub gateway_payment_id: String,
}

impl BeginVerification {
    /// Creates a new BeginVerification command.
    pub fn new(
        attempt_id: AggregateId,
        gateway_order_id: impl Into<String>,
        gateway_payment_id: impl Into<String>,
    ) -> Self {
        Self {
            attempt_id,
            gateway_order_id: gateway_order_id.into(),
            gateway_payment_id: gateway_payment_id.into(),
        }
    }
}

impl Command for BeginVerification {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}

/// Command to settle a verified payment.
#[derive(Debug, Clone)]
pub struct SettlePayment {
    /// The attempt settling.
    pub attempt_id: AggregateId,

    /// The verified gateway payment id.
    pub gateway_payment_id: String,
}

impl SettlePayment {
    /// Creates a new SettlePayment command.
    pub fn new(attempt_id: AggregateId, gateway_payment_id: impl Into<String>) -> Self {
        Self {
            attempt_id,
            gateway_payment_id: gateway_payment_id.into(),
        }
    }
}

impl Command for SettlePayment {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}

/// Command to record a verification rejection.
#[derive(Debug, Clone)]
pub struct RejectVerification {
    /// The attempt whose verification failed.
    pub attempt_id: AggregateId,

    /// Why the backend rejected verification.
    pub reason: String,
}

impl RejectVerification {
    /// Creates a new RejectVerification command.
    pub fn new(attempt_id: AggregateId, reason: impl Into<String>) -> Self {
        Self {
            attempt_id,
            reason: reason.into(),
        }
    }
}

impl Command for RejectVerification {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}

/// Command to record the persisted order after finalization.
#[derive(Debug, Clone)]
pub struct RecordOrderPlaced {
    /// The attempt whose order was placed.
    pub attempt_id: AggregateId,

    /// Reference of the persisted order.
    pub order_ref: String,
}

impl RecordOrderPlaced {
    /// Creates a new RecordOrderPlaced command.
    pub fn new(attempt_id: AggregateId, order_ref: impl Into<String>) -> Self {
        Self {
            attempt_id,
            order_ref: order_ref.into(),
        }
    }
}

impl Command for RecordOrderPlaced {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}

/// Command to record a failed order placement after settlement.
#[derive(Debug, Clone)]
pub struct RecordOrderPlacementFailure {
    /// The attempt whose order placement failed.
    pub attempt_id: AggregateId,

    /// Why placement failed.
    pub reason: String,
}

impl RecordOrderPlacementFailure {
    /// Creates a new RecordOrderPlacementFailure command.
    pub fn new(attempt_id: AggregateId, reason: impl Into<String>) -> Self {
        Self {
            attempt_id,
            reason: reason.into(),
        }
    }
}

impl Command for RecordOrderPlacementFailure {
    type Aggregate = CheckoutAttempt;

    fn aggregate_id(&self) -> AggregateId {
        self.attempt_id
    }
}
