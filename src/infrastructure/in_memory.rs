use crate::domain::ports::ReferenceDataStore;
use crate::domain::reference::ReferenceData;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory holder for the reference data snapshot.
///
/// Uses `Arc<RwLock<Option<ReferenceData>>>` so clones share one snapshot.
/// Ideal for tests or when the catalog is re-read from file on every run.
#[derive(Default, Clone)]
pub struct InMemoryReferenceStore {
    snapshot: Arc<RwLock<Option<ReferenceData>>>,
}

impl InMemoryReferenceStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `data`.
    pub fn with_data(data: ReferenceData) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Some(data))),
        }
    }
}

#[async_trait]
impl ReferenceDataStore for InMemoryReferenceStore {
    async fn store(&self, data: ReferenceData) -> Result<()> {
        data.validate()?;
        let mut snapshot = self.snapshot.write().await;
        *snapshot = Some(data);
        Ok(())
    }

    async fn load(&self) -> Result<Option<ReferenceData>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{ModuleId, ZoneId};
    use crate::domain::money::{Price, Weight};
    use crate::domain::price::PriceTier;
    use crate::domain::zone::Zone;
    use crate::error::RateError;
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;

    fn snapshot() -> ReferenceData {
        ReferenceData {
            zones: vec![Zone {
                id: ZoneId(1),
                name: "EU".to_string(),
                delivery_time_in_days: 3,
                countries: BTreeSet::from(["FRA".parse().unwrap()]),
                delivery_modules: BTreeSet::from([ModuleId(1)]),
            }],
            price_tiers: vec![PriceTier {
                zone_id: ZoneId(1),
                max_weight: Weight::new(dec!(5)).unwrap(),
                price_with_tax: Price::new(dec!(5)).unwrap(),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_in_memory_store_roundtrip() {
        let store = InMemoryReferenceStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.store(snapshot()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(snapshot()));
    }

    #[tokio::test]
    async fn test_in_memory_store_replaces_snapshot() {
        let store = InMemoryReferenceStore::with_data(snapshot());
        store.store(ReferenceData::default()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(ReferenceData::default()));
    }

    #[tokio::test]
    async fn test_in_memory_store_rejects_inconsistent_snapshot() {
        let store = InMemoryReferenceStore::with_data(snapshot());
        let mut broken = snapshot();
        broken.price_tiers[0].zone_id = ZoneId(42);

        assert!(matches!(
            store.store(broken).await,
            Err(RateError::ReferenceData(_))
        ));
        assert_eq!(store.load().await.unwrap(), Some(snapshot()));
    }
}
