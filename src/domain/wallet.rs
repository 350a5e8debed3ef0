use crate::error::MarketError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Represents the credit held in a user's wallet.
///
/// This is a wrapper around `rust_decimal::Decimal` so that wallet arithmetic
/// never goes through floating point.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(pub Decimal);

/// Represents a non-negative price, such as a tutor's hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, MarketError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(MarketError::ValidationError(
                "Amount must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = MarketError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn can_afford(&self, price: Amount) -> bool {
        self.0 >= price.0
    }

    /// Returns the balance left after paying `price`, refusing to go below zero.
    pub fn checked_debit(&self, price: Amount) -> Result<Self, MarketError> {
        if self.can_afford(price) {
            Ok(*self - price.into())
        } else {
            Err(MarketError::InsufficientFunds {
                balance: self.0,
                price: price.0,
            })
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_arithmetic() {
        let b1 = Balance::new(dec!(10.0));
        let b2 = Balance::new(dec!(5.0));
        assert_eq!(b1 + b2, Balance::new(dec!(15.0)));
        assert_eq!(b1 - b2, Balance::new(dec!(5.0)));
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(Amount::new(dec!(0.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(MarketError::ValidationError(_))
        ));
    }

    #[test]
    fn test_amount_deserialization_rejects_negative() {
        let ok: Amount = serde_json::from_str("50").unwrap();
        assert_eq!(ok.value(), dec!(50));
        assert!(serde_json::from_str::<Amount>("-5").is_err());
    }

    #[test]
    fn test_checked_debit_success() {
        let balance = Balance::new(dec!(300));
        let rest = balance.checked_debit(Amount::new(dec!(50)).unwrap()).unwrap();
        assert_eq!(rest, Balance::new(dec!(250)));
    }

    #[test]
    fn test_checked_debit_exact_balance() {
        let balance = Balance::new(dec!(50));
        let rest = balance.checked_debit(Amount::new(dec!(50)).unwrap()).unwrap();
        assert_eq!(rest, Balance::ZERO);
    }

    #[test]
    fn test_checked_debit_insufficient() {
        let balance = Balance::new(dec!(20));
        let result = balance.checked_debit(Amount::new(dec!(50)).unwrap());
        assert!(matches!(
            result,
            Err(MarketError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_display_normalizes() {
        assert_eq!(Balance::new(dec!(250.00)).to_string(), "250");
        assert_eq!(Amount::new(dec!(12.50)).unwrap().to_string(), "12.5");
    }
}
