//! Overdraft duration: how long, in consecutive months, the average balance
//! stays at or below a threshold over the twelve months preceding a period.

use super::error::Result;
use super::filter::balances_between;
use super::monthly::{MonthlyAverage, monthly_averages};
use super::outcome::{Outcome, Unavailable};
use super::period::YearMonth;
use super::records::BalanceRecord;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

pub const OVERDRAFT_WINDOW_MONTHS: i32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdraftMonth {
    pub month: YearMonth,
    pub mean_balance: f64,
    pub below_threshold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdraftReport {
    pub threshold: f64,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub months: Vec<OverdraftMonth>,
    /// Lengths of each maximal run of overdrawn months, in order.
    pub runs: Vec<u32>,
    /// Mean run length in months; `0.0` when no month is overdrawn.
    pub mean_duration: f64,
    pub longest_run: u32,
    pub overdrawn_months: usize,
}

/// The twelve calendar months ending the month before `period`.
pub fn overdraft_window(period: YearMonth) -> Result<(NaiveDate, NaiveDate)> {
    let first = period.shift(-OVERDRAFT_WINDOW_MONTHS)?;
    let last = period.shift(-1)?;
    Ok((first.first_day(), last.last_day()))
}

pub fn overdraft_duration(
    balances: &[BalanceRecord],
    account: i64,
    period: YearMonth,
    threshold: f64,
) -> Result<Outcome<OverdraftReport>> {
    let (window_start, window_end) = overdraft_window(period)?;
    let window = balances_between(balances, account, window_start, window_end);
    if window.is_empty() {
        debug!(account, %period, "No balances in overdraft window");
        return Ok(Outcome::unavailable(Unavailable::NoData));
    }

    let months = flag_months(&monthly_averages(&window), threshold);
    let runs = overdraft_runs(&months);
    let mean_duration = mean_run_length(&runs);
    let longest_run = runs.iter().copied().max().unwrap_or(0);
    let overdrawn_months = months.iter().filter(|m| m.below_threshold).count();

    debug!(?runs, mean_duration, threshold, "Computed overdraft duration");

    Ok(Outcome::computed(OverdraftReport {
        threshold,
        window_start,
        window_end,
        months,
        runs,
        mean_duration,
        longest_run,
        overdrawn_months,
    }))
}

fn flag_months(averages: &[MonthlyAverage], threshold: f64) -> Vec<OverdraftMonth> {
    averages
        .iter()
        .map(|avg| OverdraftMonth {
            month: avg.month,
            mean_balance: avg.mean_balance,
            below_threshold: avg.mean_balance <= threshold,
        })
        .collect()
}

/// Lengths of the consecutive `below_threshold` runs, in chronological order.
pub fn overdraft_runs(months: &[OverdraftMonth]) -> Vec<u32> {
    let mut runs = Vec::new();
    let mut current = 0;
    for month in months {
        if month.below_threshold {
            current += 1;
        } else if current > 0 {
            runs.push(current);
            current = 0;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    runs
}

fn mean_run_length(runs: &[u32]) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    runs.iter().map(|&r| f64::from(r)).sum::<f64>() / runs.len() as f64
}
