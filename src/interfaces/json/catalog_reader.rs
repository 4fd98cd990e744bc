use crate::domain::ids::{CountryCode, Locale, ModuleId, ZoneId};
use crate::domain::insurance::InsuranceTier;
use crate::domain::money::{DeclaredValue, Price, Weight};
use crate::domain::price::PriceTier;
use crate::domain::reference::ReferenceData;
use crate::domain::tax::TaxRule;
use crate::domain::zone::Zone;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    /// Multiplier from the catalog's currency to the shop's default currency.
    #[serde(default = "unit_rate")]
    currency_rate: Decimal,
    #[serde(default)]
    countries: BTreeSet<CountryCode>,
    #[serde(default)]
    locales: BTreeSet<Locale>,
    #[serde(default)]
    shipping_zones: Vec<CatalogZone>,
    #[serde(default)]
    insurances: Vec<CatalogInsurance>,
    #[serde(default)]
    tax_rules: Vec<TaxRule>,
}

fn unit_rate() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Deserialize)]
struct CatalogZone {
    id: ZoneId,
    name: String,
    countries: BTreeSet<CountryCode>,
    delivery_time_in_days: u32,
    delivery_modules: Option<BTreeSet<ModuleId>>,
    #[serde(default)]
    prices: Vec<CatalogPrice>,
}

#[derive(Debug, Deserialize)]
struct CatalogPrice {
    up_to: Weight,
    price: Price,
}

#[derive(Debug, Deserialize)]
struct CatalogInsurance {
    value: DeclaredValue,
    price_with_tax: Price,
    level: u32,
}

/// Reads a carrier catalog (zones with their prices, insurances and tax
/// rules) from JSON into a reference data snapshot.
pub struct CatalogReader<R: Read> {
    source: R,
}

impl<R: Read> CatalogReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Parses and validates the catalog.
    ///
    /// Zones that do not list their delivery modules are attached to
    /// `carrier_module`. Zone prices are converted with `currency_rate`.
    pub fn read(self, carrier_module: ModuleId) -> Result<ReferenceData> {
        let file: CatalogFile = serde_json::from_reader(self.source)?;
        let rate = file.currency_rate;

        let mut data = ReferenceData {
            countries: file.countries,
            locales: file.locales,
            tax_rules: file.tax_rules,
            ..Default::default()
        };

        for zone in file.shipping_zones {
            for price in &zone.prices {
                data.price_tiers.push(PriceTier {
                    zone_id: zone.id,
                    max_weight: price.up_to,
                    price_with_tax: price.price.converted(rate)?,
                });
            }
            data.zones.push(Zone {
                id: zone.id,
                name: zone.name,
                delivery_time_in_days: zone.delivery_time_in_days,
                countries: zone.countries,
                delivery_modules: zone
                    .delivery_modules
                    .unwrap_or_else(|| BTreeSet::from([carrier_module])),
            });
        }

        data.insurance_tiers = file
            .insurances
            .into_iter()
            .map(|i| InsuranceTier {
                max_value: i.value,
                price_with_tax: i.price_with_tax,
                level: i.level,
            })
            .collect();

        data.validate()?;
        tracing::debug!(
            zones = data.zones.len(),
            price_tiers = data.price_tiers.len(),
            insurances = data.insurance_tiers.len(),
            "catalog read"
        );
        Ok(data)
    }
}
