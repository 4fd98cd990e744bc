use crate::domain::ids::{Locale, ModuleId, TaxRuleId};
use serde::{Deserialize, Serialize};

/// Settings the engine is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Only zones attached to this delivery module are eligible.
    pub carrier_module_id: ModuleId,
    /// Tax rule applied to postage when the caller does not name one.
    pub default_tax_rule_id: Option<TaxRuleId>,
    /// Locale used for tax rule titles missing in the requested locale.
    pub fallback_locale: Option<Locale>,
    pub allow_insurance: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            carrier_module_id: ModuleId(1),
            default_tax_rule_id: None,
            fallback_locale: None,
            allow_insurance: true,
        }
    }
}
