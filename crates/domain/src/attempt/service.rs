//! Attempt service providing a simplified API for checkout attempt commands.

use common::AggregateId;
use event_store::EventStore;

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{
    AbortPayment, BeginPayment, BeginVerification, CheckoutAttempt, ConfirmAddress, OpenGateway,
    RecordGatewayDismissal, RecordGatewayFailure, RecordOrderPlaced, RecordOrderPlacementFailure,
    RejectVerification, ReturnToAddress, SettlePayment, StartAttempt,
};

impl From<super::AttemptError> for DomainError {
    fn from(e: super::AttemptError) -> Self {
        DomainError::Attempt(e)
    }
}

/// Service for managing checkout attempts.
///
/// Wraps the command handler and provides one method per command. The
/// coordinator in the checkout crate drives these between its collaborator
/// calls.
pub struct AttemptService<S: EventStore> {
    handler: CommandHandler<S, CheckoutAttempt>,
}

impl<S: EventStore> AttemptService<S> {
    /// Creates a new attempt service with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    /// Loads an attempt, returning None if it doesn't exist.
    pub async fn get_attempt(
        &self,
        attempt_id: AggregateId,
    ) -> Result<Option<CheckoutAttempt>, DomainError> {
        self.handler.load_existing(attempt_id).await
    }

    /// Starts a new checkout attempt.
    #[tracing::instrument(skip(self))]
    pub async fn start(
        &self,
        cmd: StartAttempt,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        let attempt_id = cmd.attempt_id;
        let buyer_id = cmd.buyer_id;

        metrics::counter!("checkout_attempts_started_total").increment(1);

        self.handler
            .execute(attempt_id, |attempt| attempt.start(attempt_id, buyer_id))
            .await
    }

    /// Confirms the shipping address and advances to the payment step.
    #[tracing::instrument(skip(self, cmd), fields(attempt_id = %cmd.attempt_id))]
    pub async fn confirm_address(
        &self,
        cmd: ConfirmAddress,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        let ConfirmAddress {
            attempt_id,
            address,
            summary,
            item_count,
        } = cmd;

        self.handler
            .execute(attempt_id, |attempt| {
                attempt.confirm_address(address, summary, item_count)
            })
            .await
    }

    /// Goes back to the address step.
    #[tracing::instrument(skip(self))]
    pub async fn return_to_address(
        &self,
        cmd: ReturnToAddress,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        self.handler
            .execute(cmd.attempt_id, |attempt| attempt.return_to_address())
            .await
    }

    /// Begins a payment.
    #[tracing::instrument(skip(self))]
    pub async fn begin_payment(
        &self,
        cmd: BeginPayment,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        self.handler
            .execute(cmd.attempt_id, |attempt| attempt.begin_payment())
            .await
    }

    /// Records that the gateway widget was opened.
    #[tracing::instrument(skip(self, cmd), fields(attempt_id = %cmd.attempt_id))]
    pub async fn open_gateway(
        &self,
        cmd: OpenGateway,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        let OpenGateway {
            attempt_id,
            gateway_order_id,
            amount,
            currency,
        } = cmd;

        self.handler
            .execute(attempt_id, |attempt| {
                attempt.open_gateway(gateway_order_id, amount, currency)
            })
            .await
    }

    /// Records a gateway-reported payment failure.
    #[tracing::instrument(skip(self, cmd), fields(attempt_id = %cmd.attempt_id))]
    pub async fn record_gateway_failure(
        &self,
        cmd: RecordGatewayFailure,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        let RecordGatewayFailure {
            attempt_id,
            reason,
            gateway_order_id,
            gateway_payment_id,
        } = cmd;

        self.handler
            .execute(attempt_id, |attempt| {
                attempt.record_gateway_failure(reason, gateway_order_id, gateway_payment_id)
            })
            .await
    }

    /// Records that the buyer dismissed the gateway widget.
    #[tracing::instrument(skip(self))]
    pub async fn record_gateway_dismissal(
        &self,
        cmd: RecordGatewayDismissal,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        self.handler
            .execute(cmd.attempt_id, |attempt| attempt.record_gateway_dismissal())
            .await
    }

    /// Aborts a payment that produced no gateway outcome.
    #[tracing::instrument(skip(self))]
    pub async fn abort_payment(
        &self,
        cmd: AbortPayment,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        let reason = cmd.reason.clone();

        self.handler
            .execute(cmd.attempt_id, |attempt| attempt.abort_payment(reason))
            .await
    }

    /// Begins backend verification of a gateway success callback.
    #[tracing::instrument(skip(self, cmd), fields(attempt_id = %cmd.attempt_id))]
    pub async fn begin_verification(
        &self,
        cmd: BeginVerification,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        let BeginVerification {
            attempt_id,
            gateway_order_id,
            gateway_payment_id,
        } = cmd;

        self.handler
            .execute(attempt_id, |attempt| {
                attempt.begin_verification(&gateway_order_id, gateway_payment_id)
            })
            .await
    }

    /// Settles a verified payment.
    #[tracing::instrument(skip(self))]
    pub async fn settle(
        &self,
        cmd: SettlePayment,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        let gateway_payment_id = cmd.gateway_payment_id.clone();

        self.handler
            .execute(cmd.attempt_id, |attempt| attempt.settle(gateway_payment_id))
            .await
    }

    /// Records a verification rejection.
    #[tracing::instrument(skip(self))]
    pub async fn reject_verification(
        &self,
        cmd: RejectVerification,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        let reason = cmd.reason.clone();

        self.handler
            .execute(cmd.attempt_id, |attempt| attempt.reject_verification(reason))
            .await
    }

    /// Records the persisted order after finalization.
    #[tracing::instrument(skip(self))]
    pub async fn record_order_placed(
        &self,
        cmd: RecordOrderPlaced,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        let order_ref = cmd.order_ref.clone();

        self.handler
            .execute(cmd.attempt_id, |attempt| {
                attempt.record_order_placed(order_ref)
            })
            .await
    }

    /// Records a failed order placement after settlement.
    #[tracing::instrument(skip(self))]
    pub async fn record_order_placement_failure(
        &self,
        cmd: RecordOrderPlacementFailure,
    ) -> Result<CommandResult<CheckoutAttempt>, DomainError> {
        let reason = cmd.reason.clone();

        self.handler
            .execute(cmd.attempt_id, |attempt| {
                attempt.record_order_placement_failure(reason)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::{
        AddressForm, BuyerId, CartLine, CheckoutStep, Money, PaymentPhase, ShippingPolicy,
        price_cart,
    };
    use event_store::InMemoryEventStore;

    fn create_service() -> AttemptService<InMemoryEventStore> {
        AttemptService::new(InMemoryEventStore::new())
    }

    fn sample_confirm(attempt_id: AggregateId) -> ConfirmAddress {
        let mut form = AddressForm::new();
        form.set_full_name("Asha Gond");
        form.set_phone("9876543210");
        form.set_address_line("12 Forest Lane");
        form.set_city("Bhopal");
        form.set_pincode("462001");
        let address = form.validate().unwrap();

        let lines = vec![CartLine::new(
            "CRAFT-001",
            "Warli painting",
            2,
            Money::from_rupees(600),
        )];
        let summary = price_cart(&lines, &ShippingPolicy::default());
        ConfirmAddress::new(attempt_id, address, summary, lines.len())
    }

    #[tokio::test]
    async fn start_and_reload_attempt() {
        let service = create_service();
        let cmd = StartAttempt::for_buyer(BuyerId::new());
        let attempt_id = cmd.attempt_id;

        service.start(cmd).await.unwrap();

        let attempt = service.get_attempt(attempt_id).await.unwrap().unwrap();
        assert_eq!(attempt.step(), CheckoutStep::Address);
        assert_eq!(attempt.phase(), PaymentPhase::Idle);
    }

    #[tokio::test]
    async fn get_attempt_returns_none_for_unknown() {
        let service = create_service();
        let result = service.get_attempt(AggregateId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn full_command_sequence_is_replayable() {
        let service = create_service();
        let cmd = StartAttempt::for_buyer(BuyerId::new());
        let attempt_id = cmd.attempt_id;
        service.start(cmd).await.unwrap();

        service
            .confirm_address(sample_confirm(attempt_id))
            .await
            .unwrap();
        service
            .begin_payment(BeginPayment::new(attempt_id))
            .await
            .unwrap();
        service
            .open_gateway(OpenGateway::new(
                attempt_id,
                "order_0001",
                Money::from_rupees(1200),
                "INR",
            ))
            .await
            .unwrap();
        service
            .begin_verification(BeginVerification::new(attempt_id, "order_0001", "pay_0001"))
            .await
            .unwrap();
        service
            .settle(SettlePayment::new(attempt_id, "pay_0001"))
            .await
            .unwrap();
        let result = service
            .record_order_placed(RecordOrderPlaced::new(attempt_id, "ORD-0001"))
            .await
            .unwrap();

        assert!(result.aggregate.is_settled());

        // Reload from the store and verify the replayed state matches
        let attempt = service.get_attempt(attempt_id).await.unwrap().unwrap();
        assert!(attempt.is_settled());
        assert_eq!(attempt.order_ref(), Some("ORD-0001"));
        assert_eq!(attempt.gateway_payment_id(), Some("pay_0001"));
    }

    #[tokio::test]
    async fn invalid_command_surfaces_attempt_error() {
        let service = create_service();
        let cmd = StartAttempt::for_buyer(BuyerId::new());
        let attempt_id = cmd.attempt_id;
        service.start(cmd).await.unwrap();

        // Pay before confirming the address
        let result = service.begin_payment(BeginPayment::new(attempt_id)).await;
        assert!(matches!(result, Err(DomainError::Attempt(_))));
    }
}
