//! Credit usage rate: daily balance as a share of the credit limit.

use super::error::{AnalysisError, Result};
use super::outcome::{Outcome, Unavailable};
use super::records::BalanceRecord;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageDay {
    pub date: NaiveDate,
    pub balance: i64,
    pub usage_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReport {
    pub credit_limit: f64,
    pub days: Vec<UsageDay>,
    pub mean_rate: f64,
    pub max_rate: f64,
    pub mean_balance: f64,
}

/// Computes the per-day usage rate for balances already filtered to one
/// account and month, and the mean rate over the month.
///
/// Fails only when `credit_limit` is not a positive finite number; an empty
/// selection is reported as [`Unavailable::NoData`].
pub fn usage_rate(balances: &[BalanceRecord], credit_limit: f64) -> Result<Outcome<UsageReport>> {
    if !credit_limit.is_finite() || credit_limit <= 0.0 {
        return Err(AnalysisError::InvalidCreditLimit(credit_limit));
    }
    if balances.is_empty() {
        return Ok(Outcome::unavailable(Unavailable::NoData));
    }

    let days: Vec<UsageDay> = balances
        .iter()
        .map(|r| UsageDay {
            date: r.position_date,
            balance: r.balance,
            usage_rate: r.balance as f64 / credit_limit * 100.0,
        })
        .collect();

    let count = days.len() as f64;
    let mean_rate = days.iter().map(|d| d.usage_rate).sum::<f64>() / count;
    let max_rate = days
        .iter()
        .map(|d| d.usage_rate)
        .fold(f64::NEG_INFINITY, f64::max);
    let mean_balance = days.iter().map(|d| d.balance as f64).sum::<f64>() / count;

    debug!(credit_limit, mean_rate, max_rate, "Computed usage rate");

    Ok(Outcome::computed(UsageReport {
        credit_limit,
        days,
        mean_rate,
        max_rate,
        mean_balance,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balances(values: &[i64]) -> Vec<BalanceRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, b)| BalanceRecord {
                account: 1,
                position_date: NaiveDate::from_ymd_opt(2024, 3, i as u32 + 1).unwrap(),
                balance: *b,
            })
            .collect()
    }

    #[test]
    fn test_daily_rates_and_mean() {
        let report = usage_rate(&balances(&[100, 200, 150]), 1000.0)
            .unwrap()
            .into_value()
            .unwrap();

        let rates: Vec<f64> = report.days.iter().map(|d| d.usage_rate).collect();
        assert_eq!(rates, vec![10.0, 20.0, 15.0]);
        assert_eq!(report.mean_rate, 15.0);
        assert_eq!(report.max_rate, 20.0);
        assert_eq!(report.mean_balance, 150.0);
    }

    #[test]
    fn test_doubling_limit_halves_rates() {
        let records = balances(&[120, -40, 310, 55]);
        let base = usage_rate(&records, 500.0).unwrap().into_value().unwrap();
        let doubled = usage_rate(&records, 1000.0).unwrap().into_value().unwrap();

        for (a, b) in base.days.iter().zip(&doubled.days) {
            assert!((a.usage_rate / 2.0 - b.usage_rate).abs() < 1e-12);
        }
        assert!((base.mean_rate / 2.0 - doubled.mean_rate).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input_is_no_data() {
        let outcome = usage_rate(&[], 1000.0).unwrap();
        assert_eq!(outcome.reason(), Some(Unavailable::NoData));
    }

    #[test]
    fn test_non_positive_limit_is_rejected() {
        let records = balances(&[100]);
        assert_eq!(
            usage_rate(&records, 0.0),
            Err(AnalysisError::InvalidCreditLimit(0.0))
        );
        assert!(usage_rate(&records, -10.0).is_err());
        assert!(usage_rate(&records, f64::NAN).is_err());
        assert!(usage_rate(&[], 0.0).is_err());
    }
}
