use crate::domain::ids::ZoneId;
use crate::domain::insurance::InsuranceTier;
use crate::domain::postage::{Quote, Unavailability};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Available,
    NoEligibleZone,
    NoEligiblePriceTier,
}

impl From<Unavailability> for QuoteStatus {
    fn from(reason: Unavailability) -> Self {
        match reason {
            Unavailability::NoEligibleZone => QuoteStatus::NoEligibleZone,
            Unavailability::NoEligiblePriceTier => QuoteStatus::NoEligiblePriceTier,
        }
    }
}

/// One output row: the request key and what was quoted for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostageRecord {
    pub country: String,
    pub weight: Decimal,
    pub status: QuoteStatus,
    pub amount: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub tax_rule_title: Option<String>,
    pub zone: Option<ZoneId>,
    pub delivery_time_days: Option<u32>,
    pub insurance_level: Option<u32>,
    pub insurance_price: Option<Decimal>,
}

impl PostageRecord {
    pub fn new(
        country: impl Into<String>,
        weight: Decimal,
        quote: &Quote,
        insurance: Option<&InsuranceTier>,
    ) -> Self {
        let mut record = Self {
            country: country.into(),
            weight,
            status: QuoteStatus::Available,
            amount: None,
            tax_amount: None,
            tax_rule_title: None,
            zone: None,
            delivery_time_days: None,
            insurance_level: insurance.map(|i| i.level),
            insurance_price: insurance.map(|i| i.price_with_tax.value()),
        };
        match quote {
            Quote::Available(postage) => {
                record.amount = Some(postage.amount);
                record.tax_amount = Some(postage.tax_amount);
                record.tax_rule_title = Some(postage.tax_rule_title.clone());
                record.zone = postage.zone_id;
                record.delivery_time_days = postage.delivery_time_in_days;
            }
            Quote::Unavailable(reason) => record.status = (*reason).into(),
        }
        record
    }
}

/// Writes quote results as CSV, header included.
pub struct PostageWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PostageWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, record: &PostageRecord) -> Result<()> {
        self.writer.serialize(record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
