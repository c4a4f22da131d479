//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal` so that sums of many amounts stay
//! exact to the cent. It parses user input that may carry a currency symbol or thousands
//! separators in either the pt-BR (`1.234,56`) or en-US (`1,234.56`) convention, and it is stored
//! as a plain JSON number.

use crate::present::Locale;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents a currency amount.
///
/// Equality is numeric, so `150`, `150.0` and `150.00` are the same amount.
///
/// # Examples
///
/// ```
/// # use agro_ledger::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("R$ 1,500.00").unwrap();
/// let b = Amount::from_str("1500").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "1500");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// Converts a JSON-style floating point number using its shortest decimal representation, so
    /// that `0.1` becomes exactly `0.1`.
    pub fn from_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotFinite);
        }
        let text = value.to_string();
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map(Amount::new)
            .map_err(AmountError::Parse)
    }

    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or_default()
    }
}

/// An error that can occur when parsing strings or numbers into an `Amount`.
pub enum AmountError {
    Empty,
    NotFinite,
    /// The separators do not form a number in the expected convention, e.g. `150,50` read as en-US.
    Separators(String),
    Parse(rust_decimal::Error),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "the amount is empty"),
            AmountError::NotFinite => write!(f, "the amount is not a finite number"),
            AmountError::Separators(s) => {
                write!(f, "the separators in '{s}' do not form a valid number")
            }
            AmountError::Parse(e) => Display::fmt(e, f),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl Amount {
    /// Parses user input written in the conventions of `locale`.
    ///
    /// When both `,` and `.` appear, the last one is the decimal separator whatever the locale, so
    /// `R$ 1.234,56` and `$1,234.56` both read as 1234.56. With a single kind of separator:
    /// - one `.` is always the decimal point;
    /// - one `,` is the decimal separator in pt-BR and a thousands separator in en-US;
    /// - repeated separators are thousands separators.
    ///
    /// Thousands groups must be three digits long. Anything else is an error rather than a guess,
    /// so `150,50` is 150.5 in pt-BR and rejected in en-US.
    pub fn parse_with(s: &str, locale: Locale) -> Result<Self, AmountError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // Remove a currency symbol if present: "R$ 50.00", "-R$ 50.00", "$50.00", "-$50.00"
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let unsigned = unsigned
            .strip_prefix("R$")
            .or_else(|| unsigned.strip_prefix('$'))
            .unwrap_or(unsigned)
            .trim_start();

        let digits = normalize_separators(unsigned, locale)?;
        let mut value = Decimal::from_str(&digits)
            .or_else(|_| Decimal::from_scientific(&digits))
            .map_err(AmountError::Parse)?;
        if negative {
            value.set_sign_negative(true);
        }
        Ok(Amount::new(value))
    }

    /// The number of decimal places once trailing zeros are dropped: `150.50` has 1.
    pub fn decimal_places(&self) -> u32 {
        self.value.normalize().scale()
    }
}

/// Rewrites `text` with `.` as the only decimal point and no thousands separators.
fn normalize_separators(text: &str, locale: Locale) -> Result<String, AmountError> {
    let commas = text.matches(',').count();
    let dots = text.matches('.').count();
    let (decimal, grouping) = match (commas, dots) {
        (0, 0) => return Ok(text.to_string()),
        (_, _) if commas > 0 && dots > 0 => match (text.rfind(','), text.rfind('.')) {
            (Some(c), Some(d)) if c > d => (Some(','), '.'),
            _ => (Some('.'), ','),
        },
        (0, 1) => (Some('.'), ','),
        (0, _) => (None, '.'),
        (1, 0) if locale == Locale::PtBr => (Some(','), '.'),
        (_, _) => (None, ','),
    };

    let separators = || AmountError::Separators(text.to_string());
    let (integer, fraction) = match decimal {
        Some(d) => match text.rsplit_once(d) {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (text, None),
        },
        None => (text, None),
    };
    if let Some(fraction) = fraction {
        if fraction.contains([',', '.']) {
            return Err(separators());
        }
    }

    let groups: Vec<&str> = integer.split(grouping).collect();
    if groups.len() > 1 {
        let first_ok = (1..=3).contains(&groups[0].len());
        let rest_ok = groups[1..].iter().all(|g| g.len() == 3);
        let digits_ok = groups.iter().all(|g| g.chars().all(|c| c.is_ascii_digit()));
        if !(first_ok && rest_ok && digits_ok) {
            return Err(separators());
        }
    }

    let mut normalized = groups.concat();
    if let Some(fraction) = fraction {
        normalized.push('.');
        normalized.push_str(fraction);
    }
    Ok(normalized)
}

/// Parses machine-style input: en-US conventions, `1,234.56`.
impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse_with(s, Locale::EnUs)
    }
}

/// Displays the plain, normalized decimal: `150`, `150.5`, `-3.25`.
impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.normalize())
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Amount::from_f64(n),
            Raw::Text(s) => Amount::from_str(&s),
        }
        .map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
