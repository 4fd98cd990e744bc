use crate::domain::ids::ZoneId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Taxed shipping cost ready to be attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Postage {
    /// Tax-inclusive amount in the shop's default currency.
    pub amount: Decimal,
    /// Tax contained in `amount`.
    pub tax_amount: Decimal,
    pub tax_rule_title: String,
    /// Zone the price was taken from, when it came from a quote.
    pub zone_id: Option<ZoneId>,
    pub delivery_time_in_days: Option<u32>,
}

/// Why no postage could be offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unavailability {
    /// The destination belongs to no zone of the carrier.
    NoEligibleZone,
    /// Every eligible zone tops out below the cart weight.
    NoEligiblePriceTier,
}

impl fmt::Display for Unavailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailability::NoEligibleZone => f.write_str("no zone serves the destination country"),
            Unavailability::NoEligiblePriceTier => {
                f.write_str("cart weight exceeds every tier of the eligible zones")
            }
        }
    }
}

/// Result of a quote. `Unavailable` is an expected outcome, distinct from a
/// free (zero amount) postage.
#[derive(Debug, Clone, PartialEq)]
pub enum Quote {
    Available(Postage),
    Unavailable(Unavailability),
}

impl Quote {
    pub fn postage(&self) -> Option<&Postage> {
        match self {
            Quote::Available(postage) => Some(postage),
            Quote::Unavailable(_) => None,
        }
    }
}
