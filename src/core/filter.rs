//! Record selection by account and calendar period or date window.

use super::period::YearMonth;
use super::records::{BalanceRecord, MovementRecord, RecordStore};
use chrono::NaiveDate;
use tracing::debug;

/// Records of one account for one calendar month.
#[derive(Debug, Clone, Default)]
pub struct PeriodSlice {
    pub balances: Vec<BalanceRecord>,
    pub movements: Vec<MovementRecord>,
}

/// Selects the balance and movement records of `account` dated within `period`,
/// each sorted by date.
///
/// An absent source table yields an empty selection.
pub fn filter_by_period(store: &RecordStore, account: i64, period: YearMonth) -> PeriodSlice {
    let mut balances: Vec<BalanceRecord> = store
        .balances()
        .iter()
        .filter(|r| r.account == account && period.contains(r.position_date))
        .cloned()
        .collect();

    let mut movements: Vec<MovementRecord> = store
        .movements()
        .iter()
        .filter(|r| r.account == account && period.contains(r.operation_date))
        .cloned()
        .collect();

    balances.sort_by_key(|r| r.position_date);
    movements.sort_by_key(|r| r.operation_date);

    debug!(
        account,
        %period,
        balances = balances.len(),
        movements = movements.len(),
        "Filtered records for period"
    );

    PeriodSlice {
        balances,
        movements,
    }
}

/// Balance records of `account` dated within `[start, end]`, sorted by date.
///
/// The sort is stable, so same-day duplicates keep their source order.
pub fn balances_between(
    balances: &[BalanceRecord],
    account: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<BalanceRecord> {
    let mut selected: Vec<BalanceRecord> = balances
        .iter()
        .filter(|r| r.account == account && r.position_date >= start && r.position_date <= end)
        .cloned()
        .collect();
    selected.sort_by_key(|r| r.position_date);
    debug!(account, %start, %end, rows = selected.len(), "Selected balance window");
    selected
}
