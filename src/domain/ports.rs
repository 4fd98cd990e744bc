use super::reference::ReferenceData;
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for the reference data snapshot quotes are computed from.
///
/// `store` replaces the whole snapshot; readers never observe a mix of two.
#[async_trait]
pub trait ReferenceDataStore: Send + Sync {
    async fn store(&self, data: ReferenceData) -> Result<()>;
    async fn load(&self) -> Result<Option<ReferenceData>>;
}

pub type ReferenceDataStoreBox = Box<dyn ReferenceDataStore>;
pub type ReferenceDataStoreFactory = Box<dyn Fn() -> ReferenceDataStoreBox + Send + Sync>;
