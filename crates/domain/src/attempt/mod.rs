//! Checkout attempt aggregate and related types.

mod address;
mod aggregate;
mod commands;
mod events;
mod pricing;
mod service;
mod state;
mod value_objects;

pub use address::{AddressError, AddressForm, ShippingAddress};
pub use aggregate::CheckoutAttempt;
pub use commands::*;
pub use events::{
    AddressConfirmedData, AttemptEvent, AttemptStartedData, GatewayDismissedData,
    GatewayFailedData, GatewayOpenedData, OrderPlacedData, OrderPlacementFailedData,
    PaymentAbortedData, PaymentInitiatedData, PaymentSettledData, ReturnedToAddressData,
    VerificationRejectedData, VerificationStartedData,
};
pub use pricing::{PriceSummary, ShippingPolicy, price_cart};
pub use service::AttemptService;
pub use state::{CheckoutStep, PaymentPhase};
pub use value_objects::{BuyerId, CartLine, Money, ProductRef};

use thiserror::Error;

/// Errors that can occur when a checkout attempt rejects a command.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The attempt has already been started.
    #[error("Checkout attempt already started")]
    AlreadyStarted,

    /// The attempt has not been started yet.
    #[error("Checkout attempt not started")]
    NotStarted,

    /// The wizard is on the wrong step for the requested action.
    #[error("Invalid step transition: cannot {action} from the {current} step")]
    InvalidStep {
        current: CheckoutStep,
        action: &'static str,
    },

    /// The payment phase does not allow the requested action.
    #[error("Invalid payment transition: cannot {action} while {current}")]
    InvalidPhase {
        current: PaymentPhase,
        action: &'static str,
    },

    /// The cart has no lines, so checkout cannot proceed.
    #[error("Cart is empty")]
    EmptyCart,

    /// A gateway callback referenced a different gateway order than the one
    /// this attempt opened.
    #[error("Gateway order mismatch: expected {expected}, got {got}")]
    MismatchedGatewayOrder { expected: String, got: String },

    /// The attempt already has a persisted order.
    #[error("Order already placed for this attempt")]
    OrderAlreadyPlaced,
}
