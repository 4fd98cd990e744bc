use crate::domain::ids::{CountryCode, Locale, TaxRuleId};
use crate::domain::money::{Price, round_money};
use crate::error::{RateError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One tax component of a rule for a given country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tax {
    /// Proportional tax, `rate` in percent (20 means 20%).
    Percentage { rate: Decimal },
    /// Flat amount added on top of the running price.
    FixedAmount { amount: Decimal },
}

impl Tax {
    /// Negative rates and amounts are rejected when reference data is loaded.
    pub fn is_valid(&self) -> bool {
        match self {
            Tax::Percentage { rate } => *rate >= Decimal::ZERO,
            Tax::FixedAmount { amount } => *amount >= Decimal::ZERO,
        }
    }

    /// Inverse of applying this tax: the amount before the tax was added.
    /// `None` when the component cannot be reversed.
    fn remove_from(&self, taxed: Decimal) -> Option<Decimal> {
        match self {
            Tax::Percentage { rate } => rate
                .checked_div(Decimal::ONE_HUNDRED)
                .and_then(|r| r.checked_add(Decimal::ONE))
                .and_then(|divisor| taxed.checked_div(divisor)),
            Tax::FixedAmount { amount } => taxed.checked_sub(*amount),
        }
    }
}

/// A localized tax policy owned by the external tax registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRule {
    pub id: TaxRuleId,
    #[serde(default)]
    pub is_default: bool,
    /// Title per locale.
    #[serde(default)]
    pub titles: BTreeMap<Locale, String>,
    /// Ordered tax components per destination country. Countries missing
    /// here are not taxed by this rule.
    #[serde(default)]
    pub taxes: BTreeMap<CountryCode, Vec<Tax>>,
}

impl TaxRule {
    pub fn title(&self, locale: &Locale) -> Option<&str> {
        self.titles.get(locale).map(String::as_str)
    }

    pub fn taxes_for(&self, country: &CountryCode) -> &[Tax] {
        self.taxes.get(country).map(Vec::as_slice).unwrap_or_default()
    }

    /// Tax contained in a tax-inclusive `price` for `country`, rounded
    /// half-up to cents.
    ///
    /// Components were applied in order, so they are removed in reverse.
    ///
    /// # Errors
    ///
    /// `RateError::ReferenceData` when the components cannot be reversed or
    /// would leave a negative untaxed price.
    pub fn tax_amount_from_taxed_price(&self, price: Price, country: &CountryCode) -> Result<Decimal> {
        let taxed = price.value();
        let untaxed = self
            .taxes_for(country)
            .iter()
            .rev()
            .try_fold(taxed, |amount, tax| tax.remove_from(amount))
            .filter(|untaxed| *untaxed >= Decimal::ZERO)
            .ok_or_else(|| {
                RateError::ReferenceData(format!(
                    "Tax rule {} cannot untax {} for {}",
                    self.id, taxed, country
                ))
            })?;
        Ok(round_money(taxed - untaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rule(taxes: Vec<Tax>) -> TaxRule {
        let mut by_country = BTreeMap::new();
        by_country.insert("FRA".parse().unwrap(), taxes);
        TaxRule {
            id: TaxRuleId(1),
            is_default: true,
            titles: BTreeMap::from([("fr_FR".parse().unwrap(), "TVA 20%".to_string())]),
            taxes: by_country,
        }
    }

    fn fra() -> CountryCode {
        "FRA".parse().unwrap()
    }

    #[test]
    fn test_percentage_is_backed_out_of_taxed_price() {
        let rule = rule(vec![Tax::Percentage { rate: dec!(20) }]);
        let tax = rule
            .tax_amount_from_taxed_price(Price::new(dec!(10)).unwrap(), &fra())
            .unwrap();
        assert_eq!(tax, dec!(1.67));
    }

    #[test]
    fn test_fixed_then_percentage() {
        // 10 untaxed + 1 fixed = 11, then +10% = 12.10
        let rule = rule(vec![
            Tax::FixedAmount { amount: dec!(1) },
            Tax::Percentage { rate: dec!(10) },
        ]);
        let tax = rule
            .tax_amount_from_taxed_price(Price::new(dec!(12.10)).unwrap(), &fra())
            .unwrap();
        assert_eq!(tax, dec!(2.10));
    }

    #[test]
    fn test_untaxed_country_and_zero_price() {
        let rule = rule(vec![Tax::Percentage { rate: dec!(20) }]);
        let deu: CountryCode = "DEU".parse().unwrap();

        assert_eq!(
            rule.tax_amount_from_taxed_price(Price::new(dec!(10)).unwrap(), &deu)
                .unwrap(),
            dec!(0)
        );
        assert_eq!(
            rule.tax_amount_from_taxed_price(Price::ZERO, &fra()).unwrap(),
            dec!(0)
        );
    }

    #[test]
    fn test_irreversible_components_are_errors() {
        let price = Price::new(dec!(10)).unwrap();

        let cancelling = rule(vec![Tax::Percentage { rate: dec!(-100) }]);
        assert!(matches!(
            cancelling.tax_amount_from_taxed_price(price, &fra()),
            Err(RateError::ReferenceData(_))
        ));

        let oversized = rule(vec![Tax::FixedAmount { amount: dec!(12) }]);
        assert!(matches!(
            oversized.tax_amount_from_taxed_price(price, &fra()),
            Err(RateError::ReferenceData(_))
        ));
    }

    #[test]
    fn test_component_validity() {
        assert!(Tax::Percentage { rate: dec!(0) }.is_valid());
        assert!(Tax::FixedAmount { amount: dec!(0.30) }.is_valid());
        assert!(!Tax::Percentage { rate: dec!(-100) }.is_valid());
        assert!(!Tax::FixedAmount { amount: dec!(-1) }.is_valid());
    }

    #[test]
    fn test_title_lookup() {
        let rule = rule(vec![]);
        assert_eq!(rule.title(&"fr_FR".parse().unwrap()), Some("TVA 20%"));
        assert_eq!(rule.title(&"en_US".parse().unwrap()), None);
    }

    #[test]
    fn test_tax_deserialization() {
        let json = r#"[{"type":"percentage","rate":"5.5"},{"type":"fixed_amount","amount":"0.30"}]"#;
        let taxes: Vec<Tax> = serde_json::from_str(json).unwrap();
        assert_eq!(taxes[0], Tax::Percentage { rate: dec!(5.5) });
        assert_eq!(taxes[1], Tax::FixedAmount { amount: dec!(0.30) });
    }
}
