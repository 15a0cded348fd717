//! Domain layer for the checkout and payment-settlement system.
//!
//! This crate provides the core domain abstractions including:
//! - Aggregate trait for event-sourced entities
//! - DomainEvent trait for domain events
//! - Command trait and CommandHandler for command processing
//! - CheckoutAttempt aggregate with the wizard-step and payment-phase
//!   state machines, cart pricing, and shipping-address validation

pub mod aggregate;
pub mod attempt;
pub mod command;
pub mod error;

pub use aggregate::{Aggregate, DomainEvent};
pub use attempt::{
    AbortPayment, AddressError, AddressForm, AttemptError, AttemptEvent, AttemptService,
    BeginPayment, BeginVerification, BuyerId, CartLine, CheckoutAttempt, CheckoutStep,
    ConfirmAddress, Money, OpenGateway, PaymentPhase, PriceSummary, ProductRef,
    RecordGatewayDismissal, RecordGatewayFailure, RecordOrderPlaced, RecordOrderPlacementFailure,
    RejectVerification, ReturnToAddress, SettlePayment, ShippingAddress, ShippingPolicy,
    StartAttempt, price_cart,
};
pub use command::{Command, CommandHandler, CommandResult};
pub use error::DomainError;
