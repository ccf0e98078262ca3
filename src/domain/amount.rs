//! Transfer amount type
//!
//! Domain primitive for ACH transfer amounts. Amounts travel as decimal
//! strings end to end (form input, provider API, persisted record); this
//! type validates them once at the boundary so an invalid amount cannot
//! reach a provider call.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum single-transfer amount in USD
const MAX_AMOUNT: i64 = 1_000_000;

/// Cents, nothing smaller
const MAX_SCALE: u32 = 2;

/// A validated transfer amount.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Maximum 2 decimal places
/// - At most 1,000,000 USD
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransferAmount(Decimal);

/// Errors that can occur when creating a TransferAmount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl TransferAmount {
    /// Create a new TransferAmount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::TooManyDecimals` if more than 2 decimal places
    /// - `AmountError::Overflow` if value > 1,000,000
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        if value.scale() > MAX_SCALE {
            return Err(AmountError::TooManyDecimals(value.scale()));
        }

        if value > Decimal::from(MAX_AMOUNT) {
            return Err(AmountError::Overflow);
        }

        Ok(Self(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The canonical wire form: two decimal places, e.g. "25.50".
    pub fn as_wire(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl fmt::Display for TransferAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for TransferAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal =
            Decimal::from_str(s).map_err(|e| AmountError::ParseError(e.to_string()))?;
        TransferAmount::new(decimal)
    }
}

impl TryFrom<String> for TransferAmount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TransferAmount::from_str(&value)
    }
}

impl From<TransferAmount> for String {
    fn from(amount: TransferAmount) -> Self {
        amount.as_wire()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = TransferAmount::new(dec!(25.50));
        assert!(amount.is_ok());
        assert_eq!(amount.unwrap().as_wire(), "25.50");
    }

    #[test]
    fn test_amount_zero_rejected() {
        let amount = TransferAmount::new(Decimal::ZERO);
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_negative_rejected() {
        let amount = TransferAmount::new(dec!(-100));
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_sub_cent_rejected() {
        let amount = TransferAmount::new(dec!(0.125));
        assert!(matches!(amount, Err(AmountError::TooManyDecimals(3))));
    }

    #[test]
    fn test_amount_overflow() {
        let amount = TransferAmount::new(dec!(1000001));
        assert!(matches!(amount, Err(AmountError::Overflow)));
    }

    #[test]
    fn test_amount_max_value_ok() {
        assert!(TransferAmount::new(dec!(1000000)).is_ok());
    }

    #[test]
    fn test_amount_from_str() {
        let amount: Result<TransferAmount, _> = "25.50".parse();
        assert!(amount.is_ok());
        assert_eq!(amount.unwrap().value(), dec!(25.50));

        let bad: Result<TransferAmount, _> = "25.5.0".parse();
        assert!(matches!(bad, Err(AmountError::ParseError(_))));
    }

    #[test]
    fn test_amount_wire_form_is_two_places() {
        let amount: TransferAmount = "5".parse().unwrap();
        assert_eq!(amount.as_wire(), "5.00");
        assert_eq!(String::from(amount), "5.00");
    }
}
