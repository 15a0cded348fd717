//! Integration tests for the checkout attempt aggregate.
//!
//! These tests verify the full attempt lifecycle including event
//! persistence, aggregate reconstruction, and concurrency handling.

use common::AggregateId;
use domain::{
    AddressForm, Aggregate, AttemptService, BeginPayment, BeginVerification, BuyerId, CartLine,
    CheckoutStep, ConfirmAddress, DomainError, Money, OpenGateway, PaymentPhase,
    RecordGatewayFailure, RecordOrderPlaced, RejectVerification, ReturnToAddress, SettlePayment,
    ShippingAddress, ShippingPolicy, StartAttempt, price_cart,
};
use event_store::{AppendOptions, EventEnvelope, EventStore, InMemoryEventStore, Version};

fn create_service() -> AttemptService<InMemoryEventStore> {
    AttemptService::new(InMemoryEventStore::new())
}

fn validated_address() -> ShippingAddress {
    let mut form = AddressForm::new();
    form.set_full_name("Asha Gond");
    form.set_phone("9876543210");
    form.set_address_line("12 Forest Lane");
    form.set_city("Bhopal");
    form.set_pincode("462001");
    form.validate().unwrap()
}

fn confirm_cmd(attempt_id: AggregateId, rupees: i64) -> ConfirmAddress {
    let lines = vec![CartLine::new(
        "CRAFT-001",
        "Warli painting",
        1,
        Money::from_rupees(rupees),
    )];
    let summary = price_cart(&lines, &ShippingPolicy::default());
    ConfirmAddress::new(attempt_id, validated_address(), summary, lines.len())
}

mod attempt_lifecycle {
    use super::*;

    #[tokio::test]
    async fn settled_attempt_end_to_end() {
        let service = create_service();

        let cmd = StartAttempt::for_buyer(BuyerId::new());
        let attempt_id = cmd.attempt_id;
        let result = service.start(cmd).await.unwrap();
        assert_eq!(result.new_version, Version::first());

        let result = service
            .confirm_address(confirm_cmd(attempt_id, 1200))
            .await
            .unwrap();
        assert_eq!(result.aggregate.step(), CheckoutStep::Payment);
        assert!(result.aggregate.summary().unwrap().is_free_shipping());

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
        service
            .record_order_placed(RecordOrderPlaced::new(attempt_id, "ORD-0001"))
            .await
            .unwrap();

        // Reconstructed state matches the full history
        let attempt = service.get_attempt(attempt_id).await.unwrap().unwrap();
        assert_eq!(attempt.phase(), PaymentPhase::Settled);
        assert_eq!(attempt.order_ref(), Some("ORD-0001"));
        assert_eq!(attempt.version(), Version::new(7));
    }

    #[tokio::test]
    async fn failed_gateway_then_successful_retry() {
        let service = create_service();
        let cmd = StartAttempt::for_buyer(BuyerId::new());
        let attempt_id = cmd.attempt_id;
        service.start(cmd).await.unwrap();
        service
            .confirm_address(confirm_cmd(attempt_id, 500))
            .await
            .unwrap();

        // First try: card declined at the gateway
        service
            .begin_payment(BeginPayment::new(attempt_id))
            .await
            .unwrap();
        service
            .open_gateway(OpenGateway::new(
                attempt_id,
                "order_0001",
                Money::from_rupees(550),
                "INR",
            ))
            .await
            .unwrap();
        let result = service
            .record_gateway_failure(RecordGatewayFailure::new(
                attempt_id,
                "card declined",
                Some("order_0001".to_string()),
                Some("pay_0001".to_string()),
            ))
            .await
            .unwrap();
        assert_eq!(result.aggregate.phase(), PaymentPhase::Idle);
        assert!(!result.aggregate.processing_payment());

        // Retry: fresh intent, same frozen address
        service
            .begin_payment(BeginPayment::new(attempt_id))
            .await
            .unwrap();
        service
            .open_gateway(OpenGateway::new(
                attempt_id,
                "order_0002",
                Money::from_rupees(550),
                "INR",
            ))
            .await
            .unwrap();
        service
            .begin_verification(BeginVerification::new(attempt_id, "order_0002", "pay_0002"))
            .await
            .unwrap();
        let result = service
            .settle(SettlePayment::new(attempt_id, "pay_0002"))
            .await
            .unwrap();

        assert!(result.aggregate.is_settled());
        assert_eq!(result.aggregate.address().unwrap().pincode, "462001");
    }

    #[tokio::test]
    async fn verification_rejection_blocks_further_payment() {
        let service = create_service();
        let cmd = StartAttempt::for_buyer(BuyerId::new());
        let attempt_id = cmd.attempt_id;
        service.start(cmd).await.unwrap();
        service
            .confirm_address(confirm_cmd(attempt_id, 800))
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
                Money::from_rupees(850),
                "INR",
            ))
            .await
            .unwrap();
        service
            .begin_verification(BeginVerification::new(attempt_id, "order_0001", "pay_0001"))
            .await
            .unwrap();
        service
            .reject_verification(RejectVerification::new(attempt_id, "invalid signature"))
            .await
            .unwrap();

        let attempt = service.get_attempt(attempt_id).await.unwrap().unwrap();
        assert_eq!(attempt.phase(), PaymentPhase::VerifyFailed);

        // A verify-failed attempt cannot start another payment
        let result = service.begin_payment(BeginPayment::new(attempt_id)).await;
        assert!(matches!(result, Err(DomainError::Attempt(_))));
    }

    #[tokio::test]
    async fn back_and_forth_keeps_wizard_consistent() {
        let service = create_service();
        let cmd = StartAttempt::for_buyer(BuyerId::new());
        let attempt_id = cmd.attempt_id;
        service.start(cmd).await.unwrap();
        service
            .confirm_address(confirm_cmd(attempt_id, 300))
            .await
            .unwrap();

        let result = service
            .return_to_address(ReturnToAddress::new(attempt_id))
            .await
            .unwrap();
        assert_eq!(result.aggregate.step(), CheckoutStep::Address);
        assert!(result.aggregate.address().is_some());
    }
}

mod concurrency {
    use super::*;

    #[tokio::test]
    async fn stale_writer_gets_concurrency_conflict() {
        let store = InMemoryEventStore::new();
        let service = AttemptService::new(store.clone());

        let cmd = StartAttempt::for_buyer(BuyerId::new());
        let attempt_id = cmd.attempt_id;
        service.start(cmd).await.unwrap();

        // A writer with a stale version loses
        let stale = EventEnvelope::builder()
            .aggregate_id(attempt_id)
            .aggregate_type("CheckoutAttempt")
            .event_type("PaymentInitiated")
            .version(Version::first())
            .payload_raw(serde_json::json!({"initiated_at": "2024-01-01T00:00:00Z"}))
            .build();

        let result = store
            .append(vec![stale], AppendOptions::expect_version(Version::initial()))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn event_stream_is_ordered_by_version() {
        let store = InMemoryEventStore::new();
        let service = AttemptService::new(store.clone());

        let cmd = StartAttempt::for_buyer(BuyerId::new());
        let attempt_id = cmd.attempt_id;
        service.start(cmd).await.unwrap();
        service
            .confirm_address(confirm_cmd(attempt_id, 700))
            .await
            .unwrap();
        service
            .begin_payment(BeginPayment::new(attempt_id))
            .await
            .unwrap();

        let events = store.get_events_for_aggregate(attempt_id).await.unwrap();
        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(
            types,
            vec!["AttemptStarted", "AddressConfirmed", "PaymentInitiated"]
        );
    }
}
