//! External collaborator traits and in-memory implementations.
//!
//! The cart store, payment backend, and order backend are owned by other
//! systems; checkout talks to them through these traits.

pub mod cart;
pub mod orders;
pub mod payment;

pub use cart::{CartService, InMemoryCartService};
pub use orders::{InMemoryOrderBackend, OrderBackend, OrderRecord};
pub use payment::{
    GatewayFailureReport, InMemoryPaymentBackend, PaymentBackend, PaymentBackendError,
    PaymentIntent, VerificationClaim,
};
