use crate::error::RateError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places monetary results are rounded to.
pub const MONEY_SCALE: u32 = 2;

/// Rounds half-up to cents, the policy used for every computed tax amount.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A tax-inclusive price in the shop's default currency.
///
/// Zero is a legitimate price (free shipping). Negative prices are not
/// modelled and are rejected at construction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, RateError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(RateError::InvalidInput(format!(
                "Price must not be negative, got {}",
                value
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Converts a price expressed in another currency using `rate`.
    pub fn converted(&self, rate: Decimal) -> Result<Self, RateError> {
        Self::new(self.0 * rate)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = RateError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Cart weight in kilograms. Never negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Weight(Decimal);

impl Weight {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(kilograms: Decimal) -> Result<Self, RateError> {
        if kilograms >= Decimal::ZERO {
            Ok(Self(kilograms))
        } else {
            Err(RateError::InvalidInput(format!(
                "Weight must not be negative, got {} kg",
                kilograms
            )))
        }
    }

    pub fn kilograms(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Weight {
    type Error = RateError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Weight> for Decimal {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

impl FromStr for Weight {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| RateError::InvalidInput(format!("Invalid weight '{}': {}", s, e)))?;
        Self::new(value)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Declared value of a shipment, used to pick an insurance tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct DeclaredValue(Decimal);

impl DeclaredValue {
    pub fn new(value: Decimal) -> Result<Self, RateError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(RateError::InvalidInput(format!(
                "Declared value must not be negative, got {}",
                value
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for DeclaredValue {
    type Error = RateError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeclaredValue> for Decimal {
    fn from(value: DeclaredValue) -> Self {
        value.0
    }
}
