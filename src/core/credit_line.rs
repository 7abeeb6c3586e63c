//! Credit-line overdraft trend: peak gap and month-over-month improvement over
//! the twelve months ending with a period.

use super::error::Result;
use super::filter::balances_between;
use super::monthly::monthly_averages;
use super::outcome::{Outcome, Unavailable};
use super::period::YearMonth;
use super::records::BalanceRecord;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

pub const CREDIT_LINE_WINDOW_MONTHS: i32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditLineMonth {
    pub month: YearMonth,
    pub mean_balance: f64,
    pub gap_to_peak: f64,
    /// Mean balance of the nearest earlier month present in the window.
    pub previous_month_balance: Option<f64>,
    pub improved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakState {
    pub month: YearMonth,
    pub mean_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditLineReport {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub peak: PeakState,
    pub months: Vec<CreditLineMonth>,
    pub improvement_count: usize,
}

/// Twelve calendar months, `period` being the last.
pub fn credit_line_window(period: YearMonth) -> Result<(NaiveDate, NaiveDate)> {
    let first = period.shift(1 - CREDIT_LINE_WINDOW_MONTHS)?;
    Ok((first.first_day(), period.last_day()))
}

pub fn credit_line_trend(
    balances: &[BalanceRecord],
    account: i64,
    period: YearMonth,
) -> Result<Outcome<CreditLineReport>> {
    let (window_start, window_end) = credit_line_window(period)?;
    let window = balances_between(balances, account, window_start, window_end);
    let averages = monthly_averages(&window);

    // The first maximum wins on ties.
    let Some(peak) = averages.iter().reduce(|best, avg| {
        if avg.mean_balance > best.mean_balance {
            avg
        } else {
            best
        }
    }) else {
        debug!(account, %period, "Credit-line window is empty");
        return Ok(Outcome::unavailable(Unavailable::EmptyWindow));
    };
    let peak = PeakState {
        month: peak.month,
        mean_balance: peak.mean_balance,
    };

    let mut months = Vec::with_capacity(averages.len());
    let mut previous: Option<f64> = None;
    for avg in &averages {
        months.push(CreditLineMonth {
            month: avg.month,
            mean_balance: avg.mean_balance,
            gap_to_peak: peak.mean_balance - avg.mean_balance,
            previous_month_balance: previous,
            improved: previous.is_some_and(|p| avg.mean_balance > p),
        });
        previous = Some(avg.mean_balance);
    }
    let improvement_count = months.iter().filter(|m| m.improved).count();

    debug!(
        peak_month = %peak.month,
        improvement_count,
        "Computed credit-line trend"
    );

    Ok(Outcome::computed(CreditLineReport {
        window_start,
        window_end,
        peak,
        months,
        improvement_count,
    }))
}
