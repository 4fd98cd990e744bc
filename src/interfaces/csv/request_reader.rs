use crate::application::rate_engine::QuoteRequest;
use crate::domain::ids::TaxRuleId;
use crate::error::{RateError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of a batch quoting file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestRecord {
    pub country: String,
    pub weight: Decimal,
    pub locale: String,
    #[serde(default)]
    pub tax_rule: Option<TaxRuleId>,
    /// Declared shipment value, for insurance lookup.
    #[serde(default)]
    pub declared_value: Option<Decimal>,
}

impl RequestRecord {
    pub fn quote_request(&self) -> QuoteRequest {
        QuoteRequest {
            country: self.country.clone(),
            weight: self.weight,
            locale: self.locale.clone(),
            tax_rule: self.tax_rule,
        }
    }
}

/// Reads quote requests from a CSV source.
///
/// Wraps `csv::Reader` and yields `Result<RequestRecord>` lazily, trimming
/// whitespace and tolerating rows without the optional trailing columns.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Streams the requests without loading the whole file into memory.
    pub fn requests(self) -> impl Iterator<Item = Result<RequestRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(RateError::from))
    }
}
