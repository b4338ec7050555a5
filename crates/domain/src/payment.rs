//! Payment methods and locally generated payment references.
//!
//! A payment reference is a label recorded alongside a booking, formatted
//! `{PREFIX}-{yyyyMMddHHmmss}-{NNNN}`. It is not checked against any payment
//! system and is not unique; nothing relies on it for correctness.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Timestamp layout embedded in a reference.
const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// How the customer says they paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    MobileMoney,
    BankTransfer,
}

/// Error returned for unknown payment method names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Payment method is required. Choose mobile_money or bank_transfer.")]
pub struct UnknownPaymentMethod(pub String);

impl PaymentMethod {
    /// Reference prefix for this method.
    pub fn prefix(&self) -> &'static str {
        match self {
            PaymentMethod::MobileMoney => "MM",
            PaymentMethod::BankTransfer => "BT",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "MM" => Some(PaymentMethod::MobileMoney),
            "BT" => Some(PaymentMethod::BankTransfer),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile_money" => Ok(PaymentMethod::MobileMoney),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            _ => Err(UnknownPaymentMethod(s.to_string())),
        }
    }
}

/// Free-text payment label attached to a booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentReference(String);

impl PaymentReference {
    /// Wraps an arbitrary label. The store accepts any non-blank text.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Builds the reference for `method` at `now` with the given random component.
    ///
    /// Deterministic in its inputs; `seed` is reduced into the `1000..=9999` range.
    pub fn compose(method: PaymentMethod, now: NaiveDateTime, seed: u32) -> Self {
        let digits = 1000 + seed % 9000;
        Self(format!(
            "{}-{}-{digits}",
            method.prefix(),
            now.format(STAMP_FORMAT)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The method encoded in the prefix, if the label is a generated reference.
    pub fn method(&self) -> Option<PaymentMethod> {
        if !self.is_well_formed() {
            return None;
        }
        self.0.split('-').next().and_then(PaymentMethod::from_prefix)
    }

    /// Returns true if the label matches `(MM|BT)-\d{14}-\d{4}`.
    pub fn is_well_formed(&self) -> bool {
        let mut parts = self.0.split('-');
        let (Some(prefix), Some(stamp), Some(digits), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        PaymentMethod::from_prefix(prefix).is_some()
            && stamp.len() == 14
            && stamp.bytes().all(|b| b.is_ascii_digit())
            && digits.len() == 4
            && digits.bytes().all(|b| b.is_ascii_digit())
    }
}

impl std::fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Method and reference chosen at the payment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub reference: PaymentReference,
}

/// Produces payment references with a random four-digit suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentReferenceGenerator;

impl PaymentReferenceGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates a fresh reference for `method` stamped with `now`.
    pub fn generate(&self, method: PaymentMethod, now: NaiveDateTime) -> PaymentReference {
        let seed = (Uuid::new_v4().as_u128() & u128::from(u32::MAX)) as u32;
        PaymentReference::compose(method, now, seed)
    }

    /// Generates a reference and pairs it with its method.
    pub fn details(&self, method: PaymentMethod, now: NaiveDateTime) -> PaymentDetails {
        PaymentDetails {
            method,
            reference: self.generate(method, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 10)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    #[test]
    fn test_compose_is_deterministic() {
        let a = PaymentReference::compose(PaymentMethod::MobileMoney, now(), 42);
        let b = PaymentReference::compose(PaymentMethod::MobileMoney, now(), 42);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "MM-20250110090507-1042");
    }

    #[test]
    fn test_suffix_always_has_four_digits() {
        for seed in [0, 8999, 9000, u32::MAX] {
            let reference = PaymentReference::compose(PaymentMethod::BankTransfer, now(), seed);
            assert!(reference.is_well_formed(), "{reference}");
        }
    }

    #[test]
    fn test_generated_prefix_matches_method() {
        let generator = PaymentReferenceGenerator::new();
        let mm = generator.generate(PaymentMethod::MobileMoney, now());
        let bt = generator.generate(PaymentMethod::BankTransfer, now());
        assert!(mm.as_str().starts_with("MM-20250110090507-"));
        assert!(bt.as_str().starts_with("BT-20250110090507-"));
        assert_eq!(mm.method(), Some(PaymentMethod::MobileMoney));
        assert_eq!(bt.method(), Some(PaymentMethod::BankTransfer));
    }

    #[test]
    fn test_free_text_reference_is_not_well_formed() {
        let reference = PaymentReference::new("receipt #12");
        assert!(!reference.is_well_formed());
        assert_eq!(reference.method(), None);
        assert!(!PaymentReference::new("MM-2025-1234").is_well_formed());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(" Bank_Transfer ".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankTransfer);
        assert!("cash".parse::<PaymentMethod>().is_err());
        assert_eq!(
            serde_json::to_string(&PaymentMethod::MobileMoney).unwrap(),
            "\"mobile_money\""
        );
    }
}
