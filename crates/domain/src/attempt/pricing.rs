//! Cart pricing: subtotal, shipping, and total.

use serde::{Deserialize, Serialize};

use super::{CartLine, Money};

/// Shipping charge policy.
///
/// Shipping is free strictly above the threshold, otherwise a flat fee
/// applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    /// Subtotals above this amount ship for free.
    pub free_shipping_threshold: Money,

    /// Flat fee charged at or below the threshold.
    pub flat_fee: Money,
}

impl ShippingPolicy {
    /// Creates a policy from explicit values.
    pub fn new(free_shipping_threshold: Money, flat_fee: Money) -> Self {
        Self {
            free_shipping_threshold,
            flat_fee,
        }
    }
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_rupees(999),
            flat_fee: Money::from_rupees(50),
        }
    }
}

/// Derived price breakdown for a cart.
///
/// Never stored as authoritative data; recomputed from the cart whenever it
/// changes. The payment backend independently computes its own total and
/// its number is the one that gets charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSummary {
    /// Sum of all line totals.
    pub subtotal: Money,

    /// Shipping charge under the active policy.
    pub shipping: Money,

    /// subtotal + shipping.
    pub total: Money,
}

impl PriceSummary {
    /// Returns true if shipping is free for this summary.
    pub fn is_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Prices a cart under the given shipping policy.
///
/// Pure and idempotent; an empty cart prices to zero across the board
/// (checkout refuses to proceed with an empty cart elsewhere).
pub fn price_cart(lines: &[CartLine], policy: &ShippingPolicy) -> PriceSummary {
    let subtotal = lines
        .iter()
        .fold(Money::zero(), |acc, line| acc + line.line_total());

    let shipping = if subtotal > policy.free_shipping_threshold {
        Money::zero()
    } else {
        policy.flat_fee
    };

    PriceSummary {
        subtotal,
        shipping,
        total: subtotal + shipping,
    }
}
