//! Checkout error types.
//!
//! One variant per user-visible failure class, so callers can surface each
//! distinctly instead of collapsing them into a generic message.

use common::AggregateId;
use domain::{AddressError, DomainError};
use thiserror::Error;

use crate::services::PaymentBackendError;

/// Errors that can occur while orchestrating a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No attempt exists with the given id.
    #[error("Checkout attempt not found: {0}")]
    AttemptNotFound(AggregateId),

    /// The cart has no lines, so checkout cannot proceed.
    #[error("Cart is empty")]
    EmptyCart,

    /// The shipping address failed validation.
    #[error("{0}")]
    Address(#[from] AddressError),

    /// A payment is already in flight for this attempt; the duplicate
    /// request is a no-op.
    #[error("A payment is already being processed for this attempt")]
    PaymentInProgress,

    /// The gateway client script failed to load.
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// The gateway widget failed in an unexpected way (not a payment
    /// failure reported through its callbacks).
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// The payment backend rejected or failed a request.
    #[error(transparent)]
    Backend(#[from] PaymentBackendError),

    /// A non-test key was returned where a sandbox key was expected.
    /// The widget is never opened with unexpected credentials.
    #[error("Payment gateway configuration error: key '{key_id}' is not a sandbox key")]
    MisconfiguredGateway { key_id: String },

    /// The backend rejected verification after apparent gateway success.
    /// Money may have been debited; never retried automatically.
    #[error("Payment verification failed: {reason}")]
    VerificationFailed { reason: String },

    /// The payment settled but the order record could not be created.
    /// The most severe class: money has moved and no order exists.
    #[error("Payment succeeded but order placement failed: {reason}")]
    OrderPlacementFailed { reason: String },

    /// The cart service failed.
    #[error("Cart service error: {0}")]
    Cart(String),

    /// A domain or persistence error.
    #[error(transparent)]
    Domain(#[from] DomainError),
}
