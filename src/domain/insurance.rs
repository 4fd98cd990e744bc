use crate::domain::money::{DeclaredValue, Price};
use crate::domain::tier::{Tier, TierLadder};
use serde::{Deserialize, Serialize};

/// Insurance cover for shipments declared up to `max_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceTier {
    pub max_value: DeclaredValue,
    pub price_with_tax: Price,
    /// Severity level, higher means more cover.
    pub level: u32,
}

impl Tier for InsuranceTier {
    type Bound = DeclaredValue;

    fn bound(&self) -> DeclaredValue {
        self.max_value
    }

    fn price(&self) -> Price {
        self.price_with_tax
    }
}

/// Value-keyed insurance tiers, queried by the checkout flow.
#[derive(Debug, Clone, Default)]
pub struct InsuranceCatalog {
    ladder: TierLadder<InsuranceTier>,
    enabled: bool,
}

impl InsuranceCatalog {
    pub fn new(tiers: impl IntoIterator<Item = InsuranceTier>, enabled: bool) -> Self {
        Self {
            ladder: TierLadder::new(tiers.into_iter().collect()),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Tier covering a shipment declared at `value`, if insurance is offered
    /// and some tier is high enough.
    pub fn tier_for_value(&self, value: DeclaredValue) -> Option<&InsuranceTier> {
        if !self.enabled {
            return None;
        }
        self.ladder.at_or_above(value)
    }

    /// The cheapest tier configured at `level`.
    pub fn tier_for_level(&self, level: u32) -> Option<&InsuranceTier> {
        if !self.enabled {
            return None;
        }
        self.ladder
            .iter()
            .filter(|t| t.level == level)
            .min_by_key(|t| t.price_with_tax)
    }

    /// Every tier, ascending by covered value.
    pub fn tiers(&self) -> impl Iterator<Item = &InsuranceTier> {
        self.ladder.iter().filter(|_| self.enabled)
    }
}
