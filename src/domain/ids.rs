use crate::error::RateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO 3166-1 alpha-3 country code, stored upper case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(RateError::InvalidInput(format!(
                "Unknown country identifier '{}'",
                s
            )))
        }
    }
}

impl TryFrom<String> for CountryCode {
    type Error = RateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locale identifier in `ll_CC` form, e.g. `fr_FR`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Locale {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let well_formed = match raw.split_once('_') {
            Some((lang, region)) => {
                lang.len() == 2
                    && region.len() == 2
                    && lang.chars().all(|c| c.is_ascii_alphabetic())
                    && region.chars().all(|c| c.is_ascii_alphabetic())
            }
            None => false,
        };
        if !well_formed {
            return Err(RateError::InvalidInput(format!(
                "Unknown locale identifier '{}'",
                s
            )));
        }
        let (lang, region) = raw.split_at(2);
        Ok(Self(format!(
            "{}{}",
            lang.to_ascii_lowercase(),
            region.to_ascii_uppercase()
        )))
    }
}

impl TryFrom<String> for Locale {
    type Error = RateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

numeric_id!(
    /// Identity of a shipping zone.
    ZoneId
);
numeric_id!(
    /// Identity of a tax rule in the external tax registry.
    TaxRuleId
);
numeric_id!(
    /// Identity of the delivery module a zone is attached to.
    ModuleId
);
