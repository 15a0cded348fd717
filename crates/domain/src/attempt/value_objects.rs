//! Value objects for the checkout domain.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuyerId(Uuid);

impl BuyerId {
    /// Creates a new random buyer ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a buyer ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BuyerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BuyerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for BuyerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<BuyerId> for Uuid {
    fn from(id: BuyerId) -> Self {
        id.0
    }
}

/// Reference to a product in the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRef(String);

impl ProductRef {
    /// Creates a new product reference from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money amount in integer paise to avoid floating point issues.
///
/// The gateway charges in minor units, so paise is the native unit
/// throughout; `₹1.00` is 100 paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in paise (e.g., 1000 = ₹10.00)
    paise: i64,
}

impl Money {
    /// Creates a new Money amount from paise.
    pub fn from_paise(paise: i64) -> Self {
        Self { paise }
    }

    /// Creates a new Money amount from a whole rupee value.
    pub fn from_rupees(rupees: i64) -> Self {
        Self {
            paise: rupees * 100,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { paise: 0 }
    }

    /// Returns the amount in paise.
    pub fn paise(&self) -> i64 {
        self.paise
    }

    /// Returns the rupee portion (whole number).
    pub fn rupees(&self) -> i64 {
        self.paise / 100
    }

    /// Returns the paise portion (remainder after rupees).
    pub fn paise_part(&self) -> i64 {
        self.paise.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.paise > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.paise == 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            paise: self.paise * quantity as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.paise < 0 {
            write!(f, "-₹{}.{:02}", self.rupees().abs(), self.paise_part())
        } else {
            write!(f, "₹{}.{:02}", self.rupees(), self.paise_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            paise: self.paise + rhs.paise,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            paise: self.paise - rhs.paise,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.paise += rhs.paise;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.paise -= rhs.paise;
    }
}

/// A line in the buyer's cart.
///
/// Cart data is owned by the external cart service and read-only to
/// checkout: quantity is at least 1 and unit price non-negative by that
/// service's contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product this line refers to.
    pub product_ref: ProductRef,

    /// Human-readable product name.
    pub product_name: String,

    /// Quantity in the cart.
    pub quantity: u32,

    /// Price per unit in paise.
    pub unit_price: Money,
}

impl CartLine {
    /// Creates a new cart line.
    pub fn new(
        product_ref: impl Into<ProductRef>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_ref: product_ref.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this line (quantity * unit_price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}
