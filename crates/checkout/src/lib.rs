//! Checkout and payment-settlement orchestration.
//!
//! This crate drives one checkout attempt end to end:
//! 1. Confirm the shipping address against the live cart
//! 2. Load a fresh payment-gateway client
//! 3. Create a backend payment intent (the backend's amount is canonical)
//! 4. Collect the payment through the gateway widget
//! 5. Verify the gateway's success callback with the backend
//! 6. Finalize: place the order and clear the cart
//!
//! Every externally observable failure is recorded on the attempt and
//! mapped to a distinct error; the gateway's three callbacks are collapsed
//! into one awaitable [`PaymentOutcome`] consumed exactly once.

pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod services;

pub use coordinator::{CheckoutCoordinator, GatewayMode, GatewaySettings, PaymentResolution};
pub use error::CheckoutError;
pub use gateway::{
    CustomerPrefill, GatewayClient, GatewayLoader, GatewayProvider, InMemoryGateway,
    InMemoryGatewayProvider, PaymentOutcome,
};
pub use services::{
    CartService, InMemoryCartService, InMemoryOrderBackend, InMemoryPaymentBackend, OrderBackend,
    OrderRecord, PaymentBackend, PaymentBackendError, PaymentIntent, VerificationClaim,
};
