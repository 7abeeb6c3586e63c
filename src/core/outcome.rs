//! Result sentinels shared by every calculator.

use serde::Serialize;
use std::fmt::Display;

/// Why a calculator produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unavailable {
    /// The account has no records in the period or window.
    NoData,
    /// Fewer records than the algorithm's minimum sample.
    InsufficientData,
    /// A normalization divisor is zero.
    DegenerateInput,
    /// Monthly grouping produced no rows.
    EmptyWindow,
}

impl Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Unavailable::NoData => "no data for this account and period",
                Unavailable::InsufficientData => "insufficient data",
                Unavailable::DegenerateInput => "average balance is zero",
                Unavailable::EmptyWindow => "no monthly balances in the analysis window",
            }
        )
    }
}

/// A calculator result: either a computed value or an explicit reason for
/// its absence. A computed zero is always `Computed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    Computed { value: T },
    Unavailable { reason: Unavailable },
}

impl<T> Outcome<T> {
    pub fn computed(value: T) -> Self {
        Outcome::Computed { value }
    }

    pub fn unavailable(reason: Unavailable) -> Self {
        Outcome::Unavailable { reason }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Computed { value } => Some(value),
            Outcome::Unavailable { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Computed { value } => Some(value),
            Outcome::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<Unavailable> {
        match self {
            Outcome::Computed { .. } => None,
            Outcome::Unavailable { reason } => Some(*reason),
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Outcome::Computed { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Computed { value } => Outcome::Computed { value: f(value) },
            Outcome::Unavailable { reason } => Outcome::Unavailable { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_keeps_reason_explicit() {
        let missing: Outcome<f64> = Outcome::unavailable(Unavailable::InsufficientData);
        assert_eq!(
            serde_json::to_string(&missing).unwrap(),
            r#"{"status":"unavailable","reason":"insufficient_data"}"#
        );

        let zero = Outcome::computed(0.0);
        assert_eq!(
            serde_json::to_string(&zero).unwrap(),
            r#"{"status":"computed","value":0.0}"#
        );
    }

    #[test]
    fn test_accessors() {
        let computed = Outcome::computed(3);
        assert_eq!(computed.value(), Some(&3));
        assert!(computed.reason().is_none());
        assert_eq!(computed.map(|v| v * 2).into_value(), Some(6));

        let missing: Outcome<i32> = Outcome::unavailable(Unavailable::EmptyWindow);
        assert!(!missing.is_computed());
        assert_eq!(missing.reason(), Some(Unavailable::EmptyWindow));
    }
}
