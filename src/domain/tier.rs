//! "Up to" threshold lookup shared by weight-priced postage and value-priced
//! insurance.
//!
//! A tier applies to every quantity lower than or equal to its bound. The
//! ladder keeps tiers sorted by `(bound, price)` so the first tier whose
//! bound is `>=` the query is both the smallest admissible bound and, among
//! tiers sharing that bound, the cheapest one.

use crate::domain::money::Price;

/// Something priced "up to" an ordered bound.
pub trait Tier {
    type Bound: Ord + Copy;

    fn bound(&self) -> Self::Bound;
    fn price(&self) -> Price;
}

/// Tiers sorted by ascending bound, ties broken by ascending price.
#[derive(Debug, Clone)]
pub struct TierLadder<T: Tier> {
    tiers: Vec<T>,
}

impl<T: Tier> Default for TierLadder<T> {
    fn default() -> Self {
        Self { tiers: Vec::new() }
    }
}

impl<T: Tier> TierLadder<T> {
    pub fn new(mut tiers: Vec<T>) -> Self {
        tiers.sort_by(|a, b| {
            a.bound()
                .cmp(&b.bound())
                .then_with(|| a.price().cmp(&b.price()))
        });
        Self { tiers }
    }

    /// Smallest tier whose bound covers `quantity`, or `None` when the
    /// quantity exceeds every bound.
    ///
    /// Binary search; a linear scan over the sorted tiers gives the same answer.
    pub fn at_or_above(&self, quantity: T::Bound) -> Option<&T> {
        let index = self.tiers.partition_point(|t| t.bound() < quantity);
        self.tiers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.tiers.iter()
    }
}
