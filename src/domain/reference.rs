use crate::domain::ids::{CountryCode, Locale};
use crate::domain::insurance::InsuranceTier;
use crate::domain::price::PriceTier;
use crate::domain::tax::TaxRule;
use crate::domain::zone::Zone;
use crate::error::{RateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Immutable snapshot of the externally owned data a quote reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub price_tiers: Vec<PriceTier>,
    #[serde(default)]
    pub insurance_tiers: Vec<InsuranceTier>,
    #[serde(default)]
    pub tax_rules: Vec<TaxRule>,
    /// Countries the shop knows. Empty means any well-formed code is accepted.
    #[serde(default)]
    pub countries: BTreeSet<CountryCode>,
    /// Locales the shop knows. Empty means any well-formed locale is accepted.
    #[serde(default)]
    pub locales: BTreeSet<Locale>,
}

impl ReferenceData {
    /// Checks the structural invariants quoting relies on.
    pub fn validate(&self) -> Result<()> {
        let mut zone_ids = HashSet::new();
        for zone in &self.zones {
            if !zone_ids.insert(zone.id) {
                return Err(RateError::ReferenceData(format!(
                    "Duplicate zone id {}",
                    zone.id
                )));
            }
        }

        if let Some(orphan) = self
            .price_tiers
            .iter()
            .find(|t| !zone_ids.contains(&t.zone_id))
        {
            return Err(RateError::ReferenceData(format!(
                "Price tier references unknown zone {}",
                orphan.zone_id
            )));
        }

        let mut rule_ids = HashSet::new();
        for rule in &self.tax_rules {
            if !rule_ids.insert(rule.id) {
                return Err(RateError::ReferenceData(format!(
                    "Duplicate tax rule id {}",
                    rule.id
                )));
            }
            for (country, taxes) in &rule.taxes {
                if let Some(tax) = taxes.iter().find(|t| !t.is_valid()) {
                    return Err(RateError::ReferenceData(format!(
                        "Tax rule {} has a negative component for {}: {:?}",
                        rule.id, country, tax
                    )));
                }
            }
        }

        if !self.countries.is_empty() {
            for zone in &self.zones {
                if let Some(unknown) = zone.countries.iter().find(|c| !self.countries.contains(*c)) {
                    return Err(RateError::ReferenceData(format!(
                        "Zone {} lists unregistered country {}",
                        zone.id, unknown
                    )));
                }
            }
        }

        Ok(())
    }
}
