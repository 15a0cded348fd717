//! Checkout state machines: the two-step wizard and the payment phase.

use serde::{Deserialize, Serialize};

/// The wizard position within one checkout attempt.
///
/// Transitions:
/// ```text
/// Address ──confirm──► Payment
///    ▲                    │
///    └───────back─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutStep {
    /// Collecting and validating the shipping address.
    #[default]
    Address,

    /// Address frozen; the payment phase machine takes over.
    Payment,
}

impl CheckoutStep {
    /// Returns true if the address can be confirmed from this step.
    pub fn can_confirm_address(&self) -> bool {
        matches!(self, CheckoutStep::Address)
    }

    /// Returns true if the wizard can go back to the address step.
    pub fn can_return_to_address(&self) -> bool {
        matches!(self, CheckoutStep::Payment)
    }

    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Address => "Address",
            CheckoutStep::Payment => "Payment",
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The payment phase of a checkout attempt.
///
/// Transitions:
/// ```text
/// Idle ──► Initiating ──► AwaitingGateway ──► Verifying ──┬──► Settled
///  ▲           │                │                         └──► VerifyFailed
///  └───────────┴────────────────┘
///      (abort / gateway failure / dismissal)
/// ```
///
/// The processing-payment flag is derived from this enum rather than
/// stored: `is_processing` covers the whole span from the pay click to the
/// first terminal or recovered outcome, so the flag cannot be left stuck by
/// a missed reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentPhase {
    /// No payment in flight; a new one may be started.
    #[default]
    Idle,

    /// Gateway loading and intent creation are underway.
    Initiating,

    /// The gateway widget is open; waiting for its outcome.
    AwaitingGateway,

    /// Gateway reported success; backend verification in progress.
    Verifying,

    /// Backend confirmed the payment (terminal state).
    Settled,

    /// Backend rejected verification after apparent gateway success
    /// (terminal state; retrying is unsafe).
    VerifyFailed,
}

impl PaymentPhase {
    /// Returns true if a payment can be initiated from this phase.
    pub fn can_initiate(&self) -> bool {
        matches!(self, PaymentPhase::Idle)
    }

    /// Returns true while a payment is in flight.
    pub fn is_processing(&self) -> bool {
        matches!(
            self,
            PaymentPhase::Initiating | PaymentPhase::AwaitingGateway | PaymentPhase::Verifying
        )
    }

    /// Returns true if this is a terminal phase for the attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentPhase::Settled | PaymentPhase::VerifyFailed)
    }

    /// Returns the phase name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentPhase::Idle => "Idle",
            PaymentPhase::Initiating => "Initiating",
            PaymentPhase::AwaitingGateway => "AwaitingGateway",
            PaymentPhase::Verifying => "Verifying",
            PaymentPhase::Settled => "Settled",
            PaymentPhase::VerifyFailed => "VerifyFailed",
        }
    }
}

impl std::fmt::Display for PaymentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
