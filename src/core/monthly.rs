//! Grouping of daily balances into monthly means.

use super::period::YearMonth;
use super::records::BalanceRecord;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub account: i64,
    pub month: YearMonth,
    pub mean_balance: f64,
}

/// Averages `records` per (account, month).
///
/// Rows come back ordered by account, then chronologically. Every record
/// counts, including same-day duplicates.
pub fn monthly_averages(records: &[BalanceRecord]) -> Vec<MonthlyAverage> {
    let mut groups: BTreeMap<(i64, YearMonth), (i128, u32)> = BTreeMap::new();
    for record in records {
        let key = (record.account, YearMonth::from_date(record.position_date));
        let entry = groups.entry(key).or_insert((0, 0));
        entry.0 += i128::from(record.balance);
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((account, month), (sum, count))| MonthlyAverage {
            account,
            month,
            mean_balance: sum as f64 / f64::from(count),
        })
        .collect()
}
