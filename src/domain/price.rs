use crate::domain::ids::ZoneId;
use crate::domain::money::{Price, Weight};
use crate::domain::tier::{Tier, TierLadder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Price applying to carts weighing up to `max_weight` in one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    pub zone_id: ZoneId,
    pub max_weight: Weight,
    pub price_with_tax: Price,
}

impl Tier for PriceTier {
    type Bound = Weight;

    fn bound(&self) -> Weight {
        self.max_weight
    }

    fn price(&self) -> Price {
        self.price_with_tax
    }
}

/// Weight tiers of every zone.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    ladders: HashMap<ZoneId, TierLadder<PriceTier>>,
}

impl PriceTable {
    pub fn new(tiers: impl IntoIterator<Item = PriceTier>) -> Self {
        let mut grouped: HashMap<ZoneId, Vec<PriceTier>> = HashMap::new();
        for tier in tiers {
            grouped.entry(tier.zone_id).or_default().push(tier);
        }
        let ladders = grouped
            .into_iter()
            .map(|(zone, tiers)| (zone, TierLadder::new(tiers)))
            .collect();
        Self { ladders }
    }

    /// The tier with the smallest weight bound covering `weight` in `zone`.
    ///
    /// Tiers sharing that bound resolve to the cheapest one. `None` means the
    /// cart is heavier than anything the zone ships.
    pub fn cheapest_tier_at_or_above(&self, zone: ZoneId, weight: Weight) -> Option<&PriceTier> {
        self.ladders.get(&zone)?.at_or_above(weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn tier(zone: u32, max_weight: Decimal, price: Decimal) -> PriceTier {
        PriceTier {
            zone_id: ZoneId(zone),
            max_weight: Weight::new(max_weight).unwrap(),
            price_with_tax: Price::new(price).unwrap(),
        }
    }

    fn price_at(table: &PriceTable, zone: u32, weight: Decimal) -> Option<Decimal> {
        table
            .cheapest_tier_at_or_above(ZoneId(zone), Weight::new(weight).unwrap())
            .map(|t| t.price_with_tax.value())
    }

    #[test]
    fn test_up_to_semantics_at_boundaries() {
        let table = PriceTable::new(vec![tier(1, dec!(30), dec!(10)), tier(1, dec!(5), dec!(5))]);

        assert_eq!(price_at(&table, 1, dec!(0)), Some(dec!(5)));
        assert_eq!(price_at(&table, 1, dec!(3)), Some(dec!(5)));
        assert_eq!(price_at(&table, 1, dec!(5)), Some(dec!(5)));
        assert_eq!(price_at(&table, 1, dec!(5.01)), Some(dec!(10)));
        assert_eq!(price_at(&table, 1, dec!(30)), Some(dec!(10)));
        assert_eq!(price_at(&table, 1, dec!(31)), None);
    }

    #[test]
    fn test_smallest_bound_wins_even_when_heavier_tier_is_cheaper() {
        let table = PriceTable::new(vec![tier(1, dec!(2), dec!(9)), tier(1, dec!(10), dec!(4))]);
        assert_eq!(price_at(&table, 1, dec!(1)), Some(dec!(9)));
    }

    #[test]
    fn test_zones_are_independent() {
        let table = PriceTable::new(vec![tier(1, dec!(5), dec!(5)), tier(2, dec!(50), dec!(20))]);

        assert_eq!(price_at(&table, 2, dec!(40)), Some(dec!(20)));
        assert_eq!(price_at(&table, 1, dec!(40)), None);
        assert_eq!(price_at(&table, 3, dec!(1)), None);
    }
}
