//! Application layer: quoting orchestration.
//!
//! `RateEngine` is the entry point. It composes the zone catalog, the price
//! table and the `TaxResolver` into a pure, read-only computation over a
//! reference data snapshot loaded beforehand.

pub mod rate_engine;
pub mod tax_resolver;
