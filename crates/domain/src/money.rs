//! Money amounts held as integer cents.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Money amount represented in cents to avoid floating point issues.
///
/// On the wire an amount is a decimal string with two fractional digits
/// (`"120.00"`), the representation the store uses for prices and ledger
/// amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    cents: i64,
}

/// Error returned when a decimal amount cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("A valid number is required: '{0}'")]
pub struct MoneyParseError(pub String);

impl Money {
    /// Creates a new Money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a whole-unit value, saturating at the
    /// representable bounds.
    pub fn from_units(units: i64) -> Self {
        Self {
            cents: units.saturating_mul(100),
        }
    }

    /// Creates a Money amount from whole units, or `None` if it does not fit.
    pub fn checked_from_units(units: i64) -> Option<Self> {
        units.checked_mul(100).map(Money::from_cents)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a number of nights or units, saturating on overflow.
    pub fn times(&self, quantity: i64) -> Money {
        Money {
            cents: self.cents.saturating_mul(quantity),
        }
    }

    /// Multiplies by a number of nights or units, or `None` on overflow.
    pub fn checked_times(&self, quantity: i64) -> Option<Money> {
        self.cents.checked_mul(quantity).map(Money::from_cents)
    }

    /// Parses a decimal amount with at most two fractional digits.
    pub fn parse(value: &str) -> Result<Money, MoneyParseError> {
        let trimmed = value.trim();
        let err = || MoneyParseError(value.to_string());
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(err());
        }
        if fraction.len() > 2 || !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| err())? };
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| err())? * 10,
            _ => fraction.parse().map_err(|_| err())?,
        };
        let cents = whole.checked_mul(100).and_then(|c| c.checked_add(fraction)).ok_or_else(err)?;
        Ok(Money::from_cents(if negative { -cents } else { cents }))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl std::str::FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl std::ops::Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money {
            cents: self.cents.saturating_neg(),
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Money::parse(&text).map_err(serde::de::Error::custom),
            Raw::Integer(units) => Money::checked_from_units(units)
                .ok_or_else(|| serde::de::Error::custom(MoneyParseError(units.to_string()))),
            Raw::Float(value) => {
                let cents = (value * 100.0).round();
                if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
                    return Err(serde::de::Error::custom(MoneyParseError(value.to_string())));
                }
                Ok(Money::from_cents(cents as i64))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_two_decimals() {
        assert_eq!(Money::from_cents(12000).to_string(), "120.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-24050).to_string(), "-240.50");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("120").unwrap().cents(), 12000);
        assert_eq!(Money::parse("120.5").unwrap().cents(), 12050);
        assert_eq!(Money::parse(" 99.99 ").unwrap().cents(), 9999);
        assert_eq!(Money::parse("-10.00").unwrap().cents(), -1000);
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.234").is_err());
        assert!(Money::parse("").is_err());
    }

    #[test]
    fn test_times() {
        assert_eq!(Money::from_cents(8000).times(3).cents(), 24000);
        assert_eq!(Money::from_cents(8000).checked_times(3), Some(Money::from_cents(24000)));
        assert_eq!(Money::from_cents(i64::MAX / 2).checked_times(3), None);
        assert_eq!(Money::from_cents(i64::MAX / 2).times(3).cents(), i64::MAX);
    }

    #[test]
    fn test_out_of_range_amounts_are_refused() {
        assert!(serde_json::from_str::<Money>("100000000000000000").is_err());
        assert!(serde_json::from_str::<Money>("1e300").is_err());
        assert!(Money::parse("100000000000000000").is_err());
        assert_eq!(Money::checked_from_units(i64::MAX), None);
        assert_eq!(Money::from_units(i64::MAX).cents(), i64::MAX);
    }

    #[test]
    fn test_serde_accepts_strings_and_numbers() {
        let json = serde_json::to_string(&Money::from_cents(8050)).unwrap();
        assert_eq!(json, "\"80.50\"");
        let from_str: Money = serde_json::from_str("\"80.50\"").unwrap();
        let from_int: Money = serde_json::from_str("80").unwrap();
        let from_float: Money = serde_json::from_str("80.5").unwrap();
        assert_eq!(from_str.cents(), 8050);
        assert_eq!(from_int.cents(), 8000);
        assert_eq!(from_float.cents(), 8050);
    }
}
