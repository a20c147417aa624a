//! ISO 4217 currency codes and the accepted-currency set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Upper-case three-letter ISO 4217 code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses a code in any letter case ("xof", " XOF ").
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::empty_field("currency"));
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                format!("'{}' is not a three-letter ISO code", code),
            ));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Set of currencies a payment may settle in.
///
/// The first code listed is the one new intents are priced in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedCurrencies {
    primary: CurrencyCode,
    codes: BTreeSet<CurrencyCode>,
}

impl AcceptedCurrencies {
    /// Parses a comma-separated list ("XOF, EUR"). Rejects an empty set.
    pub fn parse_list(list: &str) -> Result<Self, ValidationError> {
        let listed = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(CurrencyCode::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let primary = listed
            .first()
            .cloned()
            .ok_or_else(|| ValidationError::empty_field("accepted_currencies"))?;

        Ok(Self {
            primary,
            codes: listed.into_iter().collect(),
        })
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.codes.contains(code)
    }

    pub fn primary(&self) -> &CurrencyCode {
        &self.primary
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.codes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let code = CurrencyCode::parse(" xof ").unwrap();
        assert_eq!(code.as_str(), "XOF");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(CurrencyCode::parse("XO").is_err());
        assert!(CurrencyCode::parse("XOFF").is_err());
    }

    #[test]
    fn parse_rejects_digits() {
        assert!(CurrencyCode::parse("952").is_err());
    }

    #[test]
    fn accepted_list_parses_multiple_codes() {
        let accepted = AcceptedCurrencies::parse_list("XOF, eur").unwrap();

        assert!(accepted.contains(&CurrencyCode::parse("XOF").unwrap()));
        assert!(accepted.contains(&CurrencyCode::parse("EUR").unwrap()));
        assert!(!accepted.contains(&CurrencyCode::parse("USD").unwrap()));
        assert_eq!(accepted.iter().count(), 2);
    }

    #[test]
    fn accepted_list_rejects_empty() {
        assert!(AcceptedCurrencies::parse_list(" , ").is_err());
    }

    #[test]
    fn primary_is_first_listed() {
        let accepted = AcceptedCurrencies::parse_list("XOF, EUR").unwrap();
        assert_eq!(accepted.primary().as_str(), "XOF");
    }
}
