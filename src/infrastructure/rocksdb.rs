use crate::domain::ports::ReferenceDataStore;
use crate::domain::reference::ReferenceData;
use crate::error::{RateError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for zones, keyed by zone id.
pub const CF_ZONES: &str = "zones";
/// Column Family for weight tiers, keyed by insertion index.
pub const CF_PRICE_TIERS: &str = "price_tiers";
/// Column Family for insurance tiers, keyed by insertion index.
pub const CF_INSURANCE_TIERS: &str = "insurance_tiers";
/// Column Family for tax rules, keyed by rule id.
pub const CF_TAX_RULES: &str = "tax_rules";
/// Column Family for the country and locale registries and the snapshot marker.
pub const CF_REGISTRY: &str = "registry";

const ALL_CFS: [&str; 5] = [
    CF_ZONES,
    CF_PRICE_TIERS,
    CF_INSURANCE_TIERS,
    CF_TAX_RULES,
    CF_REGISTRY,
];

const KEY_COUNTRIES: &[u8] = b"countries";
const KEY_LOCALES: &[u8] = b"locales";
const KEY_SNAPSHOT: &[u8] = b"snapshot";

/// A persistent reference data store using RocksDB.
///
/// Each entity kind lives in its own Column Family. A snapshot is replaced
/// with a single write batch, so a reader sees either the old or the new one.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// the column families on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            RateError::InternalError(Box::new(std::io::Error::other(format!(
                "{} column family not found",
                name
            ))))
        })
    }

    fn clear(&self, batch: &mut WriteBatch, name: &str) -> Result<()> {
        let cf = self.cf(name)?;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _) = item?;
            batch.delete_cf(cf, key);
        }
        Ok(())
    }

    fn read_all<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let cf = self.cf(name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(decode(&value)?);
        }
        Ok(values)
    }

    fn read_registry<T: DeserializeOwned + Default>(&self, key: &[u8]) -> Result<T> {
        let cf = self.cf(CF_REGISTRY)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => decode(&bytes),
            None => Ok(T::default()),
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        RateError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        RateError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl ReferenceDataStore for RocksDBStore {
    async fn store(&self, data: ReferenceData) -> Result<()> {
        data.validate()?;

        let mut batch = WriteBatch::default();
        for name in ALL_CFS {
            self.clear(&mut batch, name)?;
        }

        let zones = self.cf(CF_ZONES)?;
        for zone in &data.zones {
            batch.put_cf(zones, zone.id.0.to_be_bytes(), encode(zone)?);
        }

        let price_tiers = self.cf(CF_PRICE_TIERS)?;
        for (index, tier) in data.price_tiers.iter().enumerate() {
            batch.put_cf(price_tiers, (index as u64).to_be_bytes(), encode(tier)?);
        }

        let insurance_tiers = self.cf(CF_INSURANCE_TIERS)?;
        for (index, tier) in data.insurance_tiers.iter().enumerate() {
            batch.put_cf(insurance_tiers, (index as u64).to_be_bytes(), encode(tier)?);
        }

        let tax_rules = self.cf(CF_TAX_RULES)?;
        for rule in &data.tax_rules {
            batch.put_cf(tax_rules, rule.id.0.to_be_bytes(), encode(rule)?);
        }

        let registry = self.cf(CF_REGISTRY)?;
        batch.put_cf(registry, KEY_COUNTRIES, encode(&data.countries)?);
        batch.put_cf(registry, KEY_LOCALES, encode(&data.locales)?);
        batch.put_cf(registry, KEY_SNAPSHOT, b"");

        self.db.write(batch)?;
        tracing::debug!(
            zones = data.zones.len(),
            price_tiers = data.price_tiers.len(),
            "reference data persisted"
        );
        Ok(())
    }

    async fn load(&self) -> Result<Option<ReferenceData>> {
        let registry = self.cf(CF_REGISTRY)?;
        // Just check the marker exists without retrieving a value
        if self.db.get_pinned_cf(registry, KEY_SNAPSHOT)?.is_none() {
            return Ok(None);
        }

        Ok(Some(ReferenceData {
            zones: self.read_all(CF_ZONES)?,
            price_tiers: self.read_all(CF_PRICE_TIERS)?,
            insurance_tiers: self.read_all(CF_INSURANCE_TIERS)?,
            tax_rules: self.read_all(CF_TAX_RULES)?,
            countries: self.read_registry(KEY_COUNTRIES)?,
            locales: self.read_registry(KEY_LOCALES)?,
        }))
    }
}
