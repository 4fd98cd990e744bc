use crate::application::tax_resolver::TaxResolver;
use crate::config::EngineConfig;
use crate::domain::ids::{CountryCode, Locale, TaxRuleId};
use crate::domain::insurance::InsuranceCatalog;
use crate::domain::money::{Price, Weight};
use crate::domain::postage::{Postage, Quote, Unavailability};
use crate::domain::price::PriceTable;
use crate::domain::reference::ReferenceData;
use crate::domain::zone::{Zone, ZoneCatalog};
use crate::error::{RateError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeSet;

/// A quote as supplied by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuoteRequest {
    pub country: String,
    /// Cart weight in kilograms.
    pub weight: Decimal,
    pub locale: String,
    #[serde(default)]
    pub tax_rule: Option<TaxRuleId>,
}

impl QuoteRequest {
    pub fn new(country: impl Into<String>, weight: Decimal, locale: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            weight,
            locale: locale.into(),
            tax_rule: None,
        }
    }

    pub fn with_tax_rule(mut self, tax_rule: TaxRuleId) -> Self {
        self.tax_rule = Some(tax_rule);
        self
    }
}

/// Cheapest admissible price found across the zones serving a country.
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    zone: &'a Zone,
    price: Price,
}

/// Resolves the cheapest home-delivery postage for a destination and cart.
///
/// The engine owns immutable lookups built once from a [`ReferenceData`]
/// snapshot. Quoting only reads them, so one engine can be shared across
/// threads (e.g. behind an `Arc`) without locking.
#[derive(Debug, Clone)]
pub struct RateEngine {
    zones: ZoneCatalog,
    prices: PriceTable,
    tax: TaxResolver,
    insurance: InsuranceCatalog,
    countries: BTreeSet<CountryCode>,
    locales: BTreeSet<Locale>,
}

impl RateEngine {
    /// Builds the country index and tier ladders from `data`.
    ///
    /// # Errors
    ///
    /// `RateError::ReferenceData` if the snapshot breaks its invariants.
    pub fn new(data: &ReferenceData, config: &EngineConfig) -> Result<Self> {
        data.validate()?;

        let engine = Self {
            zones: ZoneCatalog::new(data.zones.iter().cloned(), config.carrier_module_id),
            prices: PriceTable::new(data.price_tiers.iter().cloned()),
            tax: TaxResolver::new(
                data.tax_rules.iter().cloned(),
                config.default_tax_rule_id,
                config.fallback_locale.clone(),
            ),
            insurance: InsuranceCatalog::new(
                data.insurance_tiers.iter().cloned(),
                config.allow_insurance,
            ),
            countries: data.countries.clone(),
            locales: data.locales.clone(),
        };

        if engine.zones.is_empty() {
            tracing::warn!(
                carrier_module = %config.carrier_module_id,
                "no zone is attached to the carrier module, every quote will be unavailable"
            );
        }
        tracing::info!(
            zones = engine.zones.len(),
            tax_rules = data.tax_rules.len(),
            carrier_module = %config.carrier_module_id,
            "rate engine ready"
        );
        Ok(engine)
    }

    /// Quotes home delivery of a `request.weight` kg cart to `request.country`.
    ///
    /// Returns `Quote::Unavailable` when no zone serves the country or the
    /// cart is too heavy for all of them.
    ///
    /// # Errors
    ///
    /// * `RateError::InvalidInput` for a negative weight or an unknown
    ///   country or locale. Checked before any lookup.
    /// * `RateError::TaxRuleResolution` when no single tax rule applies.
    pub fn quote(&self, request: &QuoteRequest) -> Result<Quote> {
        let (country, weight, locale) = self.validate(request)?;

        match self.cheapest(&country, weight) {
            Ok(candidate) => {
                let mut postage =
                    self.build_postage(candidate.price, &country, &locale, request.tax_rule)?;
                postage.zone_id = Some(candidate.zone.id);
                postage.delivery_time_in_days = Some(candidate.zone.delivery_time_in_days);
                Ok(Quote::Available(postage))
            }
            Err(reason) => {
                tracing::debug!(%country, %weight, %reason, "home delivery unavailable");
                Ok(Quote::Unavailable(reason))
            }
        }
    }

    /// Like [`quote`](Self::quote), but an unavailable delivery is an error.
    pub fn require_postage(&self, request: &QuoteRequest) -> Result<Postage> {
        match self.quote(request)? {
            Quote::Available(postage) => Ok(postage),
            Quote::Unavailable(reason) => Err(RateError::DeliveryUnavailable(reason)),
        }
    }

    /// Whether home delivery should be offered at all for `country`.
    pub fn is_valid_delivery(&self, country: &CountryCode) -> bool {
        !self.zones.zones_for(country).is_empty()
    }

    /// Turns a tax-inclusive `price` into a postage line for `country`.
    pub fn build_postage(
        &self,
        price: Price,
        country: &CountryCode,
        locale: &Locale,
        tax_rule: Option<TaxRuleId>,
    ) -> Result<Postage> {
        let applied = self.tax.apply(price, country, locale, tax_rule)?;

        Ok(Postage {
            amount: price.value(),
            tax_amount: applied.tax_amount,
            tax_rule_title: applied.title,
            zone_id: None,
            delivery_time_in_days: None,
        })
    }

    pub fn insurance(&self) -> &InsuranceCatalog {
        &self.insurance
    }

    fn validate(&self, request: &QuoteRequest) -> Result<(CountryCode, Weight, Locale)> {
        let weight = Weight::new(request.weight)?;
        let country: CountryCode = request.country.parse()?;
        let locale: Locale = request.locale.parse()?;

        if !self.countries.is_empty() && !self.countries.contains(&country) {
            return Err(RateError::InvalidInput(format!(
                "Unknown country identifier '{}'",
                country
            )));
        }
        if !self.locales.is_empty() && !self.locales.contains(&locale) {
            return Err(RateError::InvalidInput(format!(
                "Unknown locale identifier '{}'",
                locale
            )));
        }

        Ok((country, weight, locale))
    }

    /// Lowest tier price over every zone serving `country`.
    ///
    /// Overlapping zones are compared on price only; declaration order plays
    /// no part. Equal prices keep the zone with the lowest id.
    fn cheapest(&self, country: &CountryCode, weight: Weight) -> std::result::Result<Candidate<'_>, Unavailability> {
        let zones = self.zones.zones_for(country);
        if zones.is_empty() {
            return Err(Unavailability::NoEligibleZone);
        }

        let mut best: Option<Candidate<'_>> = None;
        for zone in zones {
            let Some(tier) = self.prices.cheapest_tier_at_or_above(zone.id, weight) else {
                tracing::trace!(zone = %zone.id, %weight, "cart exceeds zone capacity");
                continue;
            };

            if best.is_none_or(|b| tier.price_with_tax < b.price) {
                best = Some(Candidate {
                    zone,
                    price: tier.price_with_tax,
                });
                // Nothing is cheaper than free.
                if tier.price_with_tax.is_zero() {
                    break;
                }
            }
        }

        best.ok_or(Unavailability::NoEligiblePriceTier)
    }
}
