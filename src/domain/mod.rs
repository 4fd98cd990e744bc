//! Domain types and the read-only lookups quoting is built from.

pub mod ids;
pub mod insurance;
pub mod money;
pub mod ports;
pub mod postage;
pub mod price;
pub mod reference;
pub mod tax;
pub mod tier;
pub mod zone;
