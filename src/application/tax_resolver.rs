use crate::domain::ids::{CountryCode, Locale, TaxRuleId};
use crate::domain::money::Price;
use crate::domain::tax::TaxRule;
use crate::error::{RateError, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Outcome of applying a tax rule to a tax-inclusive price.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedTax {
    pub rule_id: TaxRuleId,
    pub tax_amount: Decimal,
    pub title: String,
}

/// Picks the tax rule for postage and backs its tax out of a taxed price.
#[derive(Debug, Clone, Default)]
pub struct TaxResolver {
    rules: HashMap<TaxRuleId, TaxRule>,
    default_tax_rule_id: Option<TaxRuleId>,
    fallback_locale: Option<Locale>,
}

impl TaxResolver {
    pub fn new(
        rules: impl IntoIterator<Item = TaxRule>,
        default_tax_rule_id: Option<TaxRuleId>,
        fallback_locale: Option<Locale>,
    ) -> Self {
        Self {
            rules: rules.into_iter().map(|r| (r.id, r)).collect(),
            default_tax_rule_id,
            fallback_locale,
        }
    }

    /// Selects the single applicable rule.
    ///
    /// An explicit id takes precedence over the configured default id. With
    /// neither, every rule is a candidate. Among candidates the one flagged
    /// default wins, otherwise the lowest id. No candidate at all, or several
    /// flagged rules, is a configuration defect.
    pub fn resolve(&self, explicit: Option<TaxRuleId>) -> Result<&TaxRule> {
        let wanted = explicit.or(self.default_tax_rule_id);

        let mut candidates: Vec<&TaxRule> = match wanted {
            Some(id) => self.rules.get(&id).into_iter().collect(),
            None => self.rules.values().collect(),
        };
        candidates.sort_by_key(|r| r.id);

        if candidates.is_empty() {
            return Err(RateError::TaxRuleResolution(match wanted {
                Some(id) => format!("tax rule {} does not exist", id),
                None => "no tax rule is configured".to_string(),
            }));
        }

        let defaults: Vec<&TaxRule> = candidates.iter().copied().filter(|r| r.is_default).collect();
        match defaults.as_slice() {
            [rule] => Ok(*rule),
            [] => Ok(candidates[0]),
            _ => Err(RateError::TaxRuleResolution(format!(
                "{} tax rules are flagged default",
                defaults.len()
            ))),
        }
    }

    /// Tax contained in `price` for deliveries to `country`, with the rule
    /// title in `locale`.
    pub fn apply(
        &self,
        price: Price,
        country: &CountryCode,
        locale: &Locale,
        explicit: Option<TaxRuleId>,
    ) -> Result<AppliedTax> {
        let rule = self.resolve(explicit).inspect_err(|e| {
            tracing::error!(error = %e, explicit = ?explicit, "unable to select a tax rule for postage");
        })?;

        Ok(AppliedTax {
            rule_id: rule.id,
            tax_amount: rule.tax_amount_from_taxed_price(price, country)?,
            title: self.title_of(rule, locale),
        })
    }

    fn title_of(&self, rule: &TaxRule, locale: &Locale) -> String {
        if let Some(title) = rule.title(locale) {
            return title.to_string();
        }
        if let Some(fallback) = &self.fallback_locale
            && let Some(title) = rule.title(fallback)
        {
            return title.to_string();
        }
        tracing::warn!(rule = %rule.id, %locale, "tax rule has no title for locale");
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tax::Tax;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn rule(id: u32, is_default: bool, rate: Decimal) -> TaxRule {
        TaxRule {
            id: TaxRuleId(id),
            is_default,
            titles: BTreeMap::from([
                ("fr_FR".parse().unwrap(), format!("TVA {}", id)),
                ("en_US".parse().unwrap(), format!("VAT {}", id)),
            ]),
            taxes: BTreeMap::from([(
                "FRA".parse().unwrap(),
                vec![Tax::Percentage { rate }],
            )]),
        }
    }

    fn fra() -> CountryCode {
        "FRA".parse().unwrap()
    }

    fn locale(s: &str) -> Locale {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_flag_wins_without_ids() {
        let resolver = TaxResolver::new(
            vec![rule(1, false, dec!(10)), rule(2, true, dec!(20))],
            None,
            None,
        );
        assert_eq!(resolver.resolve(None).unwrap().id, TaxRuleId(2));
    }

    #[test]
    fn test_explicit_id_beats_configured_default() {
        let resolver = TaxResolver::new(
            vec![rule(1, false, dec!(10)), rule(2, true, dec!(20))],
            Some(TaxRuleId(2)),
            None,
        );
        assert_eq!(
            resolver.resolve(Some(TaxRuleId(1))).unwrap().id,
            TaxRuleId(1)
        );
        assert_eq!(resolver.resolve(None).unwrap().id, TaxRuleId(2));
    }

    #[test]
    fn test_configured_default_id_filters_candidates() {
        let resolver = TaxResolver::new(
            vec![rule(1, false, dec!(10)), rule(2, true, dec!(20))],
            Some(TaxRuleId(1)),
            None,
        );
        assert_eq!(resolver.resolve(None).unwrap().id, TaxRuleId(1));
    }

    #[test]
    fn test_lowest_id_wins_when_none_is_flagged() {
        let resolver = TaxResolver::new(
            vec![
                rule(3, false, dec!(5)),
                rule(1, false, dec!(10)),
                rule(2, false, dec!(20)),
            ],
            None,
            None,
        );
        assert_eq!(resolver.resolve(None).unwrap().id, TaxRuleId(1));
    }

    #[test]
    fn test_resolution_failures() {
        let empty = TaxResolver::default();
        assert!(matches!(
            empty.resolve(None),
            Err(RateError::TaxRuleResolution(_))
        ));

        let missing = TaxResolver::new(vec![rule(1, true, dec!(20))], None, None);
        assert!(matches!(
            missing.resolve(Some(TaxRuleId(9))),
            Err(RateError::TaxRuleResolution(_))
        ));

        let two_defaults = TaxResolver::new(
            vec![rule(1, true, dec!(10)), rule(2, true, dec!(20))],
            None,
            None,
        );
        assert!(matches!(
            two_defaults.resolve(None),
            Err(RateError::TaxRuleResolution(_))
        ));
    }

    #[test]
    fn test_apply_backs_out_tax_and_localizes_title() {
        let resolver = TaxResolver::new(vec![rule(1, true, dec!(20))], None, None);
        let applied = resolver
            .apply(Price::new(dec!(10)).unwrap(), &fra(), &locale("fr_FR"), None)
            .unwrap();

        assert_eq!(applied.tax_amount, dec!(1.67));
        assert_eq!(applied.title, "TVA 1");
        assert_eq!(applied.rule_id, TaxRuleId(1));
    }

    #[test]
    fn test_title_fallback_locale() {
        let with_fallback =
            TaxResolver::new(vec![rule(1, true, dec!(20))], None, Some(locale("en_US")));
        let applied = with_fallback
            .apply(Price::new(dec!(10)).unwrap(), &fra(), &locale("de_DE"), None)
            .unwrap();
        assert_eq!(applied.title, "VAT 1");

        let without = TaxResolver::new(vec![rule(1, true, dec!(20))], None, None);
        let applied = without
            .apply(Price::new(dec!(10)).unwrap(), &fra(), &locale("de_DE"), None)
            .unwrap();
        assert_eq!(applied.title, "");
    }
}
