use crate::domain::postage::Unavailability;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RateError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// No single tax rule could be selected. This is a setup defect, not a
    /// "cannot ship" outcome, and must never be swallowed.
    #[error("Tax rule resolution failed: {0}")]
    TaxRuleResolution(String),
    #[error("Delivery unavailable: {0}")]
    DeliveryUnavailable(Unavailability),
    #[error("Reference data error: {0}")]
    ReferenceData(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
}

impl RateError {
    /// Whether the caller can carry on with the next request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RateError::InvalidInput(_) | RateError::DeliveryUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RateError>;
