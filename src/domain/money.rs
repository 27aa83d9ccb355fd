//! Bill amount type
//!
//! Domain primitive for bill amounts with business rule validation.
//! All amounts are validated at construction time, ensuring invalid values
//! cannot exist in the system.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum allowed bill amount
const MAX_AMOUNT: &str = "999999.99";

/// Currency scale (cents)
const SCALE: u32 = 2;

/// BillAmount represents a validated currency value.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Exactly 2 decimal places after rounding
/// - Maximum value is 999,999.99
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use billtrack::domain::BillAmount;
///
/// let amount = BillAmount::new(Decimal::new(15000, 2)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(15000, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BillAmount(Decimal);

/// Errors that can occur when creating a BillAmount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be greater than 0")]
    NotPositive(Decimal),

    #[error("Amount is too large")]
    TooLarge(Decimal),

    #[error("Amount must be a number")]
    ParseError(String),
}

impl BillAmount {
    /// Create a new BillAmount with validation.
    ///
    /// The value is rounded to cents first, so the stored amount always
    /// satisfies the invariants even when the input carries extra precision.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if the rounded value <= 0
    /// - `AmountError::TooLarge` if the rounded value > 999,999.99
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        let rounded = value.round_dp(SCALE);

        if rounded <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        let max = Decimal::from_str(MAX_AMOUNT).expect("Invalid MAX_AMOUNT constant");
        if rounded > max {
            return Err(AmountError::TooLarge(value));
        }

        Ok(Self(rounded))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for BillAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for BillAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())
            .map_err(|e| AmountError::ParseError(e.to_string()))?;
        BillAmount::new(decimal)
    }
}

impl TryFrom<String> for BillAmount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BillAmount::from_str(&value)
    }
}

impl From<BillAmount> for String {
    fn from(amount: BillAmount) -> Self {
        format!("{:.2}", amount.0)
    }
}
