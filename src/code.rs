//! Code families: period keys, rendering and parsing.
//!
//! A code is `prefix + sep + period + sep + zero-padded sequence`, e.g.
//! `LAPTOP-2501-0001`. Everything here is pure; time enters only as an
//! explicit `DateTime<Utc>` argument.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CodeError;

/// Longest accepted category identifier.
pub const MAX_CATEGORY_LEN: usize = 64;

/// Default zero-pad width of the sequence suffix.
pub const DEFAULT_WIDTH: usize = 4;

/// Widest accepted zero-pad width; a `u64` never needs more digits.
pub const MAX_WIDTH: usize = 20;

/// Longest code any family renders: the longest prefix, a daily period, a
/// full-width sequence and two separators.
pub const MAX_CODE_LEN: usize = MAX_CATEGORY_LEN + Granularity::Daily.digits() + MAX_WIDTH + 2;

/// Separator used by the built-in families.
pub const DEFAULT_SEPARATOR: char = '-';

/// Fixed category under which ticket numbers are counted.
pub const TICKET_CATEGORY: &str = "ticket";

/// How often a family's counters reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// `YY`
    Yearly,
    /// `YYMM`
    #[default]
    Monthly,
    /// `YYMMDD`
    Daily,
}

impl Granularity {
    /// Number of digits in a period key of this granularity.
    #[must_use]
    pub const fn digits(self) -> usize {
        match self {
            Self::Yearly => 2,
            Self::Monthly => 4,
            Self::Daily => 6,
        }
    }
}

/// A period key such as `2501`: ASCII digits only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey(String);

impl PeriodKey {
    /// Validates and wraps a period key.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the key is empty or has non-digit characters.
    pub fn new(key: impl Into<String>) -> Result<Self, CodeError> {
        let key = key.into();
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeError::Validation(format!("period key must be digits, got {key:?}")));
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.0
    }
}

/// Derives the period key for `now` at the given granularity.
#[must_use]
pub fn period_key(granularity: Granularity, now: DateTime<Utc>) -> PeriodKey {
    let yy = now.year().rem_euclid(100);
    let key = match granularity {
        Granularity::Yearly => format!("{yy:02}"),
        Granularity::Monthly => format!("{yy:02}{:02}", now.month()),
        Granularity::Daily => format!("{yy:02}{:02}{:02}", now.month(), now.day()),
    };
    PeriodKey(key)
}

/// Checks that a category id is usable as a counter key and code prefix.
///
/// # Errors
///
/// Returns [`CodeError::Validation`] when the id is blank, too long, or
/// contains characters outside `[A-Za-z0-9_-]`.
pub fn validate_category(category: &str) -> Result<(), CodeError> {
    check_identifier("category", category, MAX_CATEGORY_LEN)
}

/// Checks that a rendered code is usable as a record key.
///
/// Codes share the category alphabet, so they never contain path
/// separators or dots.
///
/// # Errors
///
/// Returns [`CodeError::Validation`] when the code is blank, longer than
/// [`MAX_CODE_LEN`], or contains characters outside `[A-Za-z0-9_-]`.
pub fn validate_code(code: &str) -> Result<(), CodeError> {
    check_identifier("code", code, MAX_CODE_LEN)
}

fn check_identifier(what: &str, value: &str, max_len: usize) -> Result<(), CodeError> {
    if value.trim().is_empty() {
        return Err(CodeError::Validation(format!("{what} is required")));
    }
    if value.len() > max_len {
        return Err(CodeError::Validation(format!("{what} is longer than {max_len} characters")));
    }
    if let Some(bad) = value.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-')) {
        return Err(CodeError::Validation(format!("{what} contains invalid character {bad:?}")));
    }
    Ok(())
}

/// Ordering key for rendered codes: prefix, then period, then the numeric
/// sequence, so `X-2501-10000` sorts after `X-2501-9999`.
///
/// Codes that do not split into three parts sort by their full text.
#[must_use]
pub fn code_order(code: &str, separator: char) -> (&str, &str, u64, &str) {
    let mut parts = code.rsplitn(3, separator);
    if let (Some(seq), Some(period), Some(prefix)) = (parts.next(), parts.next(), parts.next()) {
        if let Ok(sequence) = seq.parse() {
            return (prefix, period, sequence, code);
        }
    }
    (code, "", 0, code)
}

/// One numbering convention: prefix rule, reset granularity and pad width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFamily {
    /// Human-readable family name (`asset`, `ticket`).
    pub name: String,
    /// Fixed prefix; `None` uses the category itself.
    pub prefix: Option<String>,
    /// Counter reset granularity.
    pub granularity: Granularity,
    /// Minimum digits of the sequence suffix.
    pub width: usize,
    /// Separator between prefix, period and sequence.
    pub separator: char,
}

impl CodeFamily {
    /// Asset numbers: the asset type is the prefix, monthly reset.
    #[must_use]
    pub fn assets(width: usize) -> Self {
        Self {
            name: "asset".into(),
            prefix: None,
            granularity: Granularity::Monthly,
            width,
            separator: DEFAULT_SEPARATOR,
        }
    }

    /// Ticket numbers: one fixed prefix, monthly reset.
    #[must_use]
    pub fn tickets(prefix: impl Into<String>, width: usize) -> Self {
        Self {
            name: "ticket".into(),
            prefix: Some(prefix.into()),
            granularity: Granularity::Monthly,
            width,
            separator: DEFAULT_SEPARATOR,
        }
    }

    /// Checks that `category` may be counted in this family.
    ///
    /// Families that prefix codes with the category share the counter
    /// namespace with ticket numbers, so they may not use [`TICKET_CATEGORY`].
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::Validation`] for a malformed or reserved category.
    pub fn validate(&self, category: &str) -> Result<(), CodeError> {
        validate_category(category)?;
        if self.prefix.is_none() && category == TICKET_CATEGORY {
            return Err(CodeError::Validation(format!(
                "category {TICKET_CATEGORY:?} is reserved for ticket numbers"
            )));
        }
        Ok(())
    }

    /// Prefix used for codes of `category`.
    #[must_use]
    pub fn prefix_for<'a>(&'a self, category: &'a str) -> &'a str {
        self.prefix.as_deref().unwrap_or(category)
    }

    /// Renders a code. Sequences wider than `width` keep all their digits.
    #[must_use]
    pub fn render(&self, category: &str, period: &PeriodKey, sequence: u64) -> String {
        let sep = self.separator;
        let width = self.width;
        format!("{}{sep}{period}{sep}{sequence:0width$}", self.prefix_for(category))
    }

    /// Splits a code produced by [`Self::render`] back into period and sequence.
    ///
    /// Returns `None` if the prefix does not match `category`'s prefix, the
    /// period has the wrong length for this family, or the suffix is not a
    /// number of at least `width` digits.
    #[must_use]
    pub fn parse(&self, category: &str, code: &str) -> Option<(PeriodKey, u64)> {
        let mut parts = code.rsplitn(3, self.separator);
        let seq = parts.next()?;
        let period = parts.next()?;
        let prefix = parts.next()?;

        if prefix != self.prefix_for(category) {
            return None;
        }
        if period.len() != self.granularity.digits() {
            return None;
        }
        if seq.len() < self.width || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let period = PeriodKey::new(period).ok()?;
        let sequence = seq.parse().ok()?;
        Some((period, sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn monthly_period_is_yymm() {
        assert_eq!(period_key(Granularity::Monthly, at(2025, 1, 31)).as_str(), "2501");
        assert_eq!(period_key(Granularity::Monthly, at(2025, 2, 1)).as_str(), "2502");
    }

    #[test]
    fn other_granularities() {
        assert_eq!(period_key(Granularity::Yearly, at(2009, 7, 4)).as_str(), "09");
        assert_eq!(period_key(Granularity::Daily, at(2025, 3, 9)).as_str(), "250309");
    }

    #[test]
    fn year_rollover_changes_key() {
        let dec = period_key(Granularity::Monthly, at(2024, 12, 31));
        let jan = period_key(Granularity::Monthly, at(2025, 1, 1));
        assert_eq!(dec.as_str(), "2412");
        assert_ne!(dec, jan);
    }

    #[test]
    fn renders_asset_code() {
        let family = CodeFamily::assets(4);
        let period = PeriodKey::new("2501").unwrap();
        assert_eq!(family.render("LAPTOP", &period, 1), "LAPTOP-2501-0001");
    }

    #[test]
    fn renders_ticket_code_with_fixed_prefix() {
        let family = CodeFamily::tickets("TKT", 4);
        let period = PeriodKey::new("2503").unwrap();
        assert_eq!(family.render(TICKET_CATEGORY, &period, 38), "TKT-2503-0038");
    }

    #[test]
    fn overflow_widens_instead_of_truncating() {
        let family = CodeFamily::assets(4);
        let period = PeriodKey::new("2501").unwrap();
        let code = family.render("LAPTOP", &period, 10_000);
        assert_eq!(code, "LAPTOP-2501-10000");
        assert_eq!(family.parse("LAPTOP", &code), Some((period, 10_000)));
    }

    #[test]
    fn parse_round_trips_hyphenated_category() {
        let family = CodeFamily::assets(4);
        let period = PeriodKey::new("2512").unwrap();
        let code = family.render("HP-LASER", &period, 42);
        assert_eq!(code, "HP-LASER-2512-0042");
        assert_eq!(family.parse("HP-LASER", &code), Some((period, 42)));
    }

    #[test]
    fn parse_rejects_foreign_codes() {
        let family = CodeFamily::assets(4);
        assert_eq!(family.parse("LAPTOP", "DESKTOP-2501-0001"), None);
        assert_eq!(family.parse("LAPTOP", "LAPTOP-25011-0001"), None);
        assert_eq!(family.parse("LAPTOP", "LAPTOP-2501-01"), None);
        assert_eq!(family.parse("LAPTOP", "LAPTOP-2501-00x1"), None);
        assert_eq!(family.parse("LAPTOP", "garbage"), None);
    }

    #[test]
    fn validates_categories() {
        assert!(validate_category("LAPTOP").is_ok());
        assert!(validate_category("asset_type-7").is_ok());
        assert!(matches!(validate_category(""), Err(CodeError::Validation(_))));
        assert!(matches!(validate_category("   "), Err(CodeError::Validation(_))));
        assert!(matches!(validate_category("lap top"), Err(CodeError::Validation(_))));
        assert!(matches!(validate_category(&"x".repeat(65)), Err(CodeError::Validation(_))));
    }

    #[test]
    fn asset_family_reserves_ticket_category() {
        let assets = CodeFamily::assets(4);
        assert!(matches!(assets.validate(TICKET_CATEGORY), Err(CodeError::Validation(_))));
        assert!(assets.validate("TICKET").is_ok());
        assert!(CodeFamily::tickets("TKT", 4).validate(TICKET_CATEGORY).is_ok());
    }

    #[test]
    fn longest_category_renders_a_valid_code() {
        let family = CodeFamily { granularity: Granularity::Daily, ..CodeFamily::assets(MAX_WIDTH) };
        let period = PeriodKey::new("250309").unwrap();
        let code = family.render(&"A".repeat(MAX_CATEGORY_LEN), &period, u64::MAX);
        assert_eq!(code.len(), MAX_CODE_LEN);
        assert!(validate_code(&code).is_ok());
        assert!(validate_code("../etc/passwd").is_err());
        assert!(validate_code(&"A".repeat(MAX_CODE_LEN + 1)).is_err());
    }

    #[test]
    fn code_order_compares_sequences_numerically() {
        let mut codes = vec!["X-2501-10000", "X-2502-0001", "X-2501-9999", "garbage"];
        codes.sort_by(|a, b| code_order(a, '-').cmp(&code_order(b, '-')));
        assert_eq!(codes, ["X-2501-9999", "X-2501-10000", "X-2502-0001", "garbage"]);
    }

    #[test]
    fn period_key_rejects_non_digits() {
        assert!(PeriodKey::new("25a1").is_err());
        assert!(PeriodKey::new("").is_err());
    }
}
