//! Routed turnover: upward balance movements over the average balance of a
//! three-month trailing window.

use super::error::Result;
use super::filter::balances_between;
use super::outcome::{Outcome, Unavailable};
use super::period::YearMonth;
use super::records::BalanceRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Display;
use tracing::debug;

/// Months covered by the window, the target month included.
pub const TURNOVER_WINDOW_MONTHS: i32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverDay {
    pub date: NaiveDate,
    pub balance: i64,
    /// Change from the previous row; `None` on the first row.
    pub difference: Option<i128>,
    pub credit_flow: i128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverBand {
    High,
    Moderate,
    Low,
}

impl TurnoverBand {
    pub fn from_turnover(turnover: f64) -> Self {
        if turnover > 200.0 {
            TurnoverBand::High
        } else if turnover > 100.0 {
            TurnoverBand::Moderate
        } else {
            TurnoverBand::Low
        }
    }
}

impl Display for TurnoverBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TurnoverBand::High => "High activity (above 200%)",
                TurnoverBand::Moderate => "Moderate activity (100% to 200%)",
                TurnoverBand::Low => "Low activity (below 100%)",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverReport {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub days: Vec<TurnoverDay>,
    pub total_credit_flow: i128,
    pub mean_balance: f64,
    pub turnover: f64,
    pub band: TurnoverBand,
}

/// Closed date window `[first day of period - 2 months, last day of period]`.
pub fn turnover_window(period: YearMonth) -> Result<(NaiveDate, NaiveDate)> {
    let start = period.shift(1 - TURNOVER_WINDOW_MONTHS)?;
    Ok((start.first_day(), period.last_day()))
}

/// Computes the routed turnover of `account` for the window ending at `period`.
pub fn routed_turnover(
    balances: &[BalanceRecord],
    account: i64,
    period: YearMonth,
) -> Result<Outcome<TurnoverReport>> {
    let (window_start, window_end) = turnover_window(period)?;
    let window = balances_between(balances, account, window_start, window_end);
    Ok(turnover_from_sorted(&window).map(|(days, total_credit_flow, mean_balance, turnover)| {
        TurnoverReport {
            window_start,
            window_end,
            days,
            total_credit_flow,
            mean_balance,
            turnover,
            band: TurnoverBand::from_turnover(turnover),
        }
    }))
}

type TurnoverParts = (Vec<TurnoverDay>, i128, f64, f64);

fn turnover_from_sorted(window: &[BalanceRecord]) -> Outcome<TurnoverParts> {
    if window.len() < 2 {
        debug!(rows = window.len(), "Not enough balances for turnover");
        return Outcome::unavailable(Unavailable::InsufficientData);
    }

    let mut days = Vec::with_capacity(window.len());
    // Differences of two i64 balances can exceed i64.
    let mut previous: Option<i128> = None;
    let mut total_credit_flow: i128 = 0;
    for record in window {
        let balance = i128::from(record.balance);
        let difference = previous.map(|p| balance - p);
        let credit_flow = difference.map_or(0, |d| d.max(0));
        total_credit_flow += credit_flow;
        days.push(TurnoverDay {
            date: record.position_date,
            balance: record.balance,
            difference,
            credit_flow,
        });
        previous = Some(balance);
    }

    let sum: i128 = window.iter().map(|r| i128::from(r.balance)).sum();
    if sum == 0 {
        debug!("Mean balance is zero, turnover undefined");
        return Outcome::unavailable(Unavailable::DegenerateInput);
    }
    let mean_balance = sum as f64 / window.len() as f64;
    let turnover = total_credit_flow as f64 / mean_balance * 100.0;

    debug!(%total_credit_flow, mean_balance, turnover, "Computed turnover");
    Outcome::computed((days, total_credit_flow, mean_balance, turnover))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bal(d: NaiveDate, balance: i64) -> BalanceRecord {
        BalanceRecord {
            account: 42,
            position_date: d,
            balance,
        }
    }

    fn march() -> YearMonth {
        YearMonth::new(2024, 3).unwrap()
    }

    #[test]
    fn test_window_spans_three_full_months() {
        let (start, end) = turnover_window(march()).unwrap();
        assert_eq!(start, date(2024, 1, 1));
        assert_eq!(end, date(2024, 3, 31));

        let (start, end) = turnover_window(YearMonth::new(2024, 2).unwrap()).unwrap();
        assert_eq!(start, date(2023, 12, 1));
        assert_eq!(end, date(2024, 2, 29));
    }

    #[test]
    fn test_credit_flows_only_count_increases() {
        // Deliberately unsorted input; the window is sorted by date.
        let balances = vec![
            bal(date(2024, 3, 10), 1500),
            bal(date(2024, 1, 5), 1000),
            bal(date(2024, 2, 20), 900),
            bal(date(2024, 2, 1), 1200),
        ];
        let report = routed_turnover(&balances, 42, march())
            .unwrap()
            .into_value()
            .unwrap();

        let diffs: Vec<Option<i128>> = report.days.iter().map(|d| d.difference).collect();
        assert_eq!(diffs, vec![None, Some(200), Some(-300), Some(600)]);
        let flows: Vec<i128> = report.days.iter().map(|d| d.credit_flow).collect();
        assert_eq!(flows, vec![0, 200, 0, 600]);
        assert_eq!(report.total_credit_flow, 800);
        assert_eq!(report.mean_balance, 1150.0);
        assert!((report.turnover - 69.565_217_391).abs() < 1e-6);
        assert_eq!(report.band, TurnoverBand::Low);
    }

    #[test]
    fn test_records_outside_window_or_account_are_ignored() {
        let mut balances = vec![
            bal(date(2023, 12, 31), 1_000_000),
            bal(date(2024, 1, 1), 100),
            bal(date(2024, 3, 31), 300),
            bal(date(2024, 4, 1), 1_000_000),
        ];
        balances.push(BalanceRecord {
            account: 7,
            position_date: date(2024, 2, 1),
            balance: 5_000,
        });

        let report = routed_turnover(&balances, 42, march())
            .unwrap()
            .into_value()
            .unwrap();
        assert_eq!(report.days.len(), 2);
        assert_eq!(report.total_credit_flow, 200);
        assert_eq!(report.mean_balance, 200.0);
        assert_eq!(report.turnover, 100.0);
    }

    #[test]
    fn test_fewer_than_two_rows_is_insufficient() {
        let none = routed_turnover(&[], 42, march()).unwrap();
        assert_eq!(none.reason(), Some(Unavailable::InsufficientData));

        let one = routed_turnover(&[bal(date(2024, 3, 1), 10)], 42, march()).unwrap();
        assert_eq!(one.reason(), Some(Unavailable::InsufficientData));
    }

    #[test]
    fn test_zero_mean_balance_is_degenerate() {
        let balances = vec![bal(date(2024, 3, 1), -100), bal(date(2024, 3, 2), 100)];
        let outcome = routed_turnover(&balances, 42, march()).unwrap();
        assert_eq!(outcome.reason(), Some(Unavailable::DegenerateInput));
    }

    #[test]
    fn test_scale_invariance() {
        let values = [400, 650, 300, 900, 880, 1200];
        let make = |k: i64| -> Vec<BalanceRecord> {
            values
                .iter()
                .enumerate()
                .map(|(i, v)| bal(date(2024, 2, i as u32 + 1), v * k))
                .collect()
        };

        let base = routed_turnover(&make(1), 42, march())
            .unwrap()
            .into_value()
            .unwrap();
        let scaled = routed_turnover(&make(7), 42, march())
            .unwrap()
            .into_value()
            .unwrap();
        assert!((base.turnover - scaled.turnover).abs() < 1e-9);
    }

    #[test]
    fn test_non_decreasing_balances() {
        let values = [100, 100, 250, 400, 400, 700];
        let balances: Vec<BalanceRecord> = values
            .iter()
            .enumerate()
            .map(|(i, v)| bal(date(2024, 1, i as u32 + 10), *v))
            .collect();
        let report = routed_turnover(&balances, 42, march())
            .unwrap()
            .into_value()
            .unwrap();

        let mean = values.iter().sum::<i64>() as f64 / values.len() as f64;
        let expected = (700.0 - 100.0) / mean * 100.0;
        assert!((report.turnover - expected).abs() < 1e-9);
    }

    #[test]
    fn test_swings_near_i64_limits_do_not_overflow() {
        let balances = vec![
            bal(date(2024, 3, 1), -4_000_000_000_000_000_000),
            bal(date(2024, 3, 2), 5_500_000_000_000_000_000),
        ];
        let report = routed_turnover(&balances, 42, march())
            .unwrap()
            .into_value()
            .unwrap();

        assert_eq!(report.days[1].difference, Some(9_500_000_000_000_000_000));
        assert_eq!(report.total_credit_flow, 9_500_000_000_000_000_000);
        assert_eq!(report.mean_balance, 7.5e17);
        assert!((report.turnover - 9.5e18 / 7.5e17 * 100.0).abs() < 1e-6);
        assert_eq!(report.band, TurnoverBand::High);
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(TurnoverBand::from_turnover(250.0), TurnoverBand::High);
        assert_eq!(TurnoverBand::from_turnover(200.0), TurnoverBand::Moderate);
        assert_eq!(TurnoverBand::from_turnover(150.0), TurnoverBand::Moderate);
        assert_eq!(TurnoverBand::from_turnover(100.0), TurnoverBand::Low);
    }
}
