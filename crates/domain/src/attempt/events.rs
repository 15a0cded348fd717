//! Checkout attempt domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{BuyerId, Money, PriceSummary, ShippingAddress};

/// Events that can occur on a checkout attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AttemptEvent {
    /// A buyer opened the checkout wizard.
    AttemptStarted(AttemptStartedData),

    /// The shipping address validated and the wizard advanced to payment.
    AddressConfirmed(AddressConfirmedData),

    /// The wizard went back to the address step.
    ReturnedToAddress(ReturnedToAddressData),

    /// The buyer clicked pay; gateway load and intent creation began.
    PaymentInitiated(PaymentInitiatedData),

    /// The gateway widget was opened with a fresh payment intent.
    GatewayOpened(GatewayOpenedData),

    /// The gateway reported a failed payment (card declined, etc.).
    GatewayFailed(GatewayFailedData),

    /// The buyer dismissed the gateway widget.
    GatewayDismissed(GatewayDismissedData),

    /// The payment was aborted before reaching the gateway
    /// (loader failure, intent rejection, configuration error).
    PaymentAborted(PaymentAbortedData),

    /// The gateway reported success; backend verification began.
    VerificationStarted(VerificationStartedData),

    /// The backend confirmed signature and payment status.
    PaymentSettled(PaymentSettledData),

    /// The backend rejected verification after apparent gateway success.
    VerificationRejected(VerificationRejectedData),

    /// The verified payment was converted into a persisted order.
    OrderPlaced(OrderPlacedData),

    /// Order placement failed after the payment had settled.
    OrderPlacementFailed(OrderPlacementFailedData),
}

impl DomainEvent for AttemptEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AttemptEvent::AttemptStarted(_) => "AttemptStarted",
            AttemptEvent::AddressConfirmed(_) => "AddressConfirmed",
            AttemptEvent::ReturnedToAddress(_) => "ReturnedToAddress",
            AttemptEvent::PaymentInitiated(_) => "PaymentInitiated",
            AttemptEvent::GatewayOpened(_) => "GatewayOpened",
            AttemptEvent::GatewayFailed(_) => "GatewayFailed",
            AttemptEvent::GatewayDismissed(_) => "GatewayDismissed",
            AttemptEvent::PaymentAborted(_) => "PaymentAborted",
            AttemptEvent::VerificationStarted(_) => "VerificationStarted",
            AttemptEvent::PaymentSettled(_) => "PaymentSettled",
            AttemptEvent::VerificationRejected(_) => "VerificationRejected",
            AttemptEvent::OrderPlaced(_) => "OrderPlaced",
            AttemptEvent::OrderPlacementFailed(_) => "OrderPlacementFailed",
        }
    }
}

/// Data for AttemptStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptStartedData {
    /// The attempt ID.
    pub attempt_id: AggregateId,

    /// The buyer checking out.
    pub buyer_id: BuyerId,

    /// When the attempt started.
    pub started_at: DateTime<Utc>,
}

/// Data for AddressConfirmed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressConfirmedData {
    /// The frozen shipping address.
    pub address: ShippingAddress,

    /// Price breakdown at confirmation time.
    pub summary: PriceSummary,

    /// Number of cart lines at confirmation time.
    pub item_count: usize,

    /// When the address was confirmed.
    pub confirmed_at: DateTime<Utc>,
}

/// Data for ReturnedToAddress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnedToAddressData {
    /// When the wizard went back.
    pub returned_at: DateTime<Utc>,
}

/// Data for PaymentInitiated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInitiatedData {
    /// When the buyer clicked pay.
    pub initiated_at: DateTime<Utc>,
}

/// Data for GatewayOpened event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOpenedData {
    /// Gateway-scoped order id from the payment intent.
    pub gateway_order_id: String,

    /// Canonical amount being charged (from the backend).
    pub amount: Money,

    /// Charge currency.
    pub currency: String,

    /// When the widget was opened.
    pub opened_at: DateTime<Utc>,
}

/// Data for GatewayFailed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayFailedData {
    /// Gateway-provided failure reason.
    pub reason: String,

    /// Gateway order id, if the gateway reported one.
    pub gateway_order_id: Option<String>,

    /// Gateway payment id, if the gateway reported one.
    pub gateway_payment_id: Option<String>,

    /// When the failure was reported.
    pub failed_at: DateTime<Utc>,
}

/// Data for GatewayDismissed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayDismissedData {
    /// When the buyer closed the widget.
    pub dismissed_at: DateTime<Utc>,
}

/// Data for PaymentAborted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAbortedData {
    /// Why the payment never reached the gateway.
    pub reason: String,

    /// When the payment was aborted.
    pub aborted_at: DateTime<Utc>,
}

/// Data for VerificationStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationStartedData {
    /// Gateway payment id from the success callback.
    pub gateway_payment_id: String,

    /// When verification began.
    pub started_at: DateTime<Utc>,
}

/// Data for PaymentSettled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSettledData {
    /// The verified gateway payment id.
    pub gateway_payment_id: String,

    /// When the backend confirmed the payment.
    pub settled_at: DateTime<Utc>,
}

/// Data for VerificationRejected event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRejectedData {
    /// Why the backend rejected verification.
    pub reason: String,

    /// When verification was rejected.
    pub rejected_at: DateTime<Utc>,
}

/// Data for OrderPlaced event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedData {
    /// Reference of the persisted order.
    pub order_ref: String,

    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
}

/// Data for OrderPlacementFailed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacementFailedData {
    /// Why order placement failed.
    pub reason: String,

    /// When placement failed.
    pub failed_at: DateTime<Utc>,
}

// Convenience constructors for events
impl AttemptEvent {
    /// Creates an AttemptStarted event.
    pub fn attempt_started(attempt_id: AggregateId, buyer_id: BuyerId) -> Self {
        AttemptEvent::AttemptStarted(AttemptStartedData {
            attempt_id,
            buyer_id,
            started_at: Utc::now(),
        })
    }

    /// Creates an AddressConfirmed event.
    pub fn address_confirmed(
        address: ShippingAddress,
        summary: PriceSummary,
        item_count: usize,
    ) -> Self {
        AttemptEvent::AddressConfirmed(AddressConfirmedData {
            address,
            summary,
            item_count,
            confirmed_at: Utc::now(),
        })
    }

    /// Creates a ReturnedToAddress event.
    pub fn returned_to_address() -> Self {
        AttemptEvent::ReturnedToAddress(ReturnedToAddressData {
            returned_at: Utc::now(),
        })
    }

    /// Creates a PaymentInitiated event.
    pub fn payment_initiated() -> Self {
        AttemptEvent::PaymentInitiated(PaymentInitiatedData {
            initiated_at: Utc::now(),
        })
    }

    /// Creates a GatewayOpened event.
    pub fn gateway_opened(
        gateway_order_id: impl Into<String>,
        amount: Money,
        currency: impl Into<String>,
    ) -> Self {
        AttemptEvent::GatewayOpened(GatewayOpenedData {
            gateway_order_id: gateway_order_id.into(),
            amount,
            currency: currency.into(),
            opened_at: Utc::now(),
        })
    }

    /// Creates a GatewayFailed event.
    pub fn gateway_failed(
        reason: impl Into<String>,
        gateway_order_id: Option<String>,
        gateway_payment_id: Option<String>,
    ) -> Self {
        AttemptEvent::GatewayFailed(GatewayFailedData {
            reason: reason.into(),
            gateway_order_id,
            gateway_payment_id,
            failed_at: Utc::now(),
        })
    }

    /// Creates a GatewayDismissed event.
    pub fn gateway_dismissed() -> Self {
        AttemptEvent::GatewayDismissed(GatewayDismissedData {
            dismissed_at: Utc::now(),
        })
    }

    /// Creates a PaymentAborted event.
    pub fn payment_aborted(reason: impl Into<String>) -> Self {
        AttemptEvent::PaymentAborted(PaymentAbortedData {
            reason: reason.into(),
            aborted_at: Utc::now(),
        })
    }

    /// Creates a VerificationStarted event.
    pub fn verification_started(gateway_payment_id: impl Into<String>) -> Self {
        AttemptEvent::VerificationStarted(VerificationStartedData {
            gateway_payment_id: gateway_payment_id.into(),
            started_at: Utc::now(),
        })
    }

    /// Creates a PaymentSettled event.
    pub fn payment_settled(gateway_payment_id: impl Into<String>) -> Self {
        AttemptEvent::PaymentSettled(PaymentSettledData {
            gateway_payment_id: gateway_payment_id.into(),
            settled_at: Utc::now(),
        })
    }

    /// Creates a VerificationRejected event.
    pub fn verification_rejected(reason: impl Into<String>) -> Self {
        AttemptEvent::VerificationRejected(VerificationRejectedData {
            reason: reason.into(),
            rejected_at: Utc::now(),
        })
    }

    /// Creates an OrderPlaced event.
    pub fn order_placed(order_ref: impl Into<String>) -> Self {
        AttemptEvent::OrderPlaced(OrderPlacedData {
            order_ref: order_ref.into(),
            placed_at: Utc::now(),
        })
    }

    /// Creates an OrderPlacementFailed event.
    pub fn order_placement_failed(reason: impl Into<String>) -> Self {
        AttemptEvent::OrderPlacementFailed(OrderPlacementFailedData {
            reason: reason.into(),
            failed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::{AddressForm, ShippingPolicy, price_cart};

    fn sample_address() -> ShippingAddress {
        let mut form = AddressForm::new();
        form.set_full_name("Asha Gond");
        form.set_phone("9876543210");
        form.set_address_line("12 Forest Lane");
        form.set_city("Bhopal");
        form.set_pincode("462001");
        form.validate().unwrap()
    }

    #[test]
    fn event_types() {
        let attempt_id = AggregateId::new();
        let buyer_id = BuyerId::new();

        assert_eq!(
            AttemptEvent::attempt_started(attempt_id, buyer_id).event_type(),
            "AttemptStarted"
        );
        let summary = price_cart(&[], &ShippingPolicy::default());
        assert_eq!(
            AttemptEvent::address_confirmed(sample_address(), summary, 1).event_type(),
            "AddressConfirmed"
        );
        assert_eq!(
            AttemptEvent::returned_to_address().event_type(),
            "ReturnedToAddress"
        );
        assert_eq!(
            AttemptEvent::payment_initiated().event_type(),
            "PaymentInitiated"
        );
        assert_eq!(
            AttemptEvent::gateway_opened("order_0001", Money::from_rupees(550), "INR").event_type(),
            "GatewayOpened"
        );
        assert_eq!(
            AttemptEvent::gateway_failed("card declined", None, None).event_type(),
            "GatewayFailed"
        );
        assert_eq!(
            AttemptEvent::gateway_dismissed().event_type(),
            "GatewayDismissed"
        );
        assert_eq!(
            AttemptEvent::payment_aborted("gateway unavailable").event_type(),
            "PaymentAborted"
        );
        assert_eq!(
            AttemptEvent::verification_started("pay_0001").event_type(),
            "VerificationStarted"
        );
        assert_eq!(
            AttemptEvent::payment_settled("pay_0001").event_type(),
            "PaymentSettled"
        );
        assert_eq!(
            AttemptEvent::verification_rejected("bad signature").event_type(),
            "VerificationRejected"
        );
        assert_eq!(
            AttemptEvent::order_placed("ORD-0001").event_type(),
            "OrderPlaced"
        );
        assert_eq!(
            AttemptEvent::order_placement_failed("order service down").event_type(),
            "OrderPlacementFailed"
        );
    }

    #[test]
    fn serialization_roundtrip() {
        let events = vec![
            AttemptEvent::attempt_started(AggregateId::new(), BuyerId::new()),
            AttemptEvent::payment_initiated(),
            AttemptEvent::gateway_opened("order_0001", Money::from_rupees(1200), "INR"),
            AttemptEvent::gateway_failed("card declined", Some("order_0001".into()), None),
            AttemptEvent::verification_started("pay_0001"),
            AttemptEvent::payment_settled("pay_0001"),
            AttemptEvent::order_placed("ORD-0001"),
        ];

        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let back: AttemptEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(event.event_type(), back.event_type());
        }
    }

    #[test]
    fn gateway_opened_data_roundtrip() {
        let event = AttemptEvent::gateway_opened("order_0042", Money::from_paise(55_000), "INR");
        let json = serde_json::to_string(&event).unwrap();
        let back: AttemptEvent = serde_json::from_str(&json).unwrap();

        if let AttemptEvent::GatewayOpened(data) = back {
            assert_eq!(data.gateway_order_id, "order_0042");
            assert_eq!(data.amount.paise(), 55_000);
            assert_eq!(data.currency, "INR");
        } else {
            panic!("Expected GatewayOpened event");
        }
    }
}
