use postage_engine::application::rate_engine::{QuoteRequest, RateEngine};
use postage_engine::config::EngineConfig;
use postage_engine::domain::ids::ModuleId;
use postage_engine::domain::ports::{ReferenceDataStoreBox, ReferenceDataStoreFactory};
use postage_engine::infrastructure::in_memory::InMemoryReferenceStore;
use postage_engine::interfaces::json::catalog_reader::CatalogReader;
use rust_decimal_macros::dec;
use std::fs::File;
use std::sync::Arc;

mod common;

fn catalog() -> postage_engine::domain::reference::ReferenceData {
    let file = File::open(common::CATALOG).unwrap();
    CatalogReader::new(file).read(ModuleId(1)).unwrap()
}

#[tokio::test]
async fn test_store_as_trait_object() {
    let store: ReferenceDataStoreBox = Box::new(InMemoryReferenceStore::new());

    // Verify Send + Sync by spawning a task
    let handle = tokio::spawn(async move {
        store.store(catalog()).await.unwrap();
        store.load().await.unwrap().unwrap()
    });

    let data = handle.await.unwrap();
    assert_eq!(data.zones.len(), 3);
}

#[tokio::test]
async fn test_factory_instantiation() {
    let factory: ReferenceDataStoreFactory =
        Box::new(|| Box::new(InMemoryReferenceStore::new()) as ReferenceDataStoreBox);

    let store = factory();
    assert!(store.load().await.unwrap().is_none());
    store.store(catalog()).await.unwrap();
    assert!(store.load().await.unwrap().is_some());
}

#[tokio::test]
async fn test_concurrent_quotes_share_one_engine() {
    let engine = Arc::new(RateEngine::new(&catalog(), &EngineConfig::default()).unwrap());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let country = if i % 2 == 0 { "FRA" } else { "DEU" };
                engine
                    .require_postage(&QuoteRequest::new(country, dec!(4), "fr_FR"))
                    .unwrap()
                    .amount
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let expected = if i % 2 == 0 { dec!(5) } else { dec!(6) };
        assert_eq!(handle.await.unwrap(), expected);
    }
}
