//! Storage adapters for the reference data port.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
