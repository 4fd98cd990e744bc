use crate::domain::ids::{CountryCode, ModuleId, ZoneId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A named group of destination countries served with one delivery-time
/// estimate and one price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub delivery_time_in_days: u32,
    pub countries: BTreeSet<CountryCode>,
    /// Delivery modules this zone is attached to.
    #[serde(default)]
    pub delivery_modules: BTreeSet<ModuleId>,
}

impl Zone {
    pub fn covers(&self, country: &CountryCode) -> bool {
        self.countries.contains(country)
    }

    pub fn is_attached_to(&self, module: ModuleId) -> bool {
        self.delivery_modules.contains(&module)
    }
}

/// Zones attached to one carrier module, indexed by member country.
///
/// A country may belong to several zones. The index does not pick between
/// them; quoting compares prices across all of them.
#[derive(Debug, Clone, Default)]
pub struct ZoneCatalog {
    zones: HashMap<ZoneId, Zone>,
    by_country: HashMap<CountryCode, BTreeSet<ZoneId>>,
}

impl ZoneCatalog {
    /// Builds the catalog from every configured zone, keeping only those
    /// attached to `carrier_module`.
    pub fn new(zones: impl IntoIterator<Item = Zone>, carrier_module: ModuleId) -> Self {
        let mut catalog = Self::default();
        for zone in zones {
            if !zone.is_attached_to(carrier_module) {
                tracing::debug!(zone = %zone.id, name = %zone.name, "zone not attached to carrier module, skipped");
                continue;
            }
            for country in &zone.countries {
                catalog
                    .by_country
                    .entry(country.clone())
                    .or_default()
                    .insert(zone.id);
            }
            catalog.zones.insert(zone.id, zone);
        }
        catalog
    }

    /// Eligible zones for `country`, in ascending id order. Empty when the
    /// carrier does not serve the country.
    pub fn zones_for(&self, country: &CountryCode) -> Vec<&Zone> {
        self.by_country
            .get(country)
            .into_iter()
            .flatten()
            .filter_map(|id| self.zones.get(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
