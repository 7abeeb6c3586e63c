//! Balance and movement records as supplied by the ingestion layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// End-of-day balance of an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub account: i64,
    pub position_date: NaiveDate,
    pub balance: i64,
}

/// A booked movement on an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementRecord {
    pub account: i64,
    pub operation_date: NaiveDate,
    pub amount: i64,
    pub label: Option<String>,
    pub operation_code: Option<String>,
    pub reference: Option<String>,
    pub operation_number: Option<String>,
}

impl MovementRecord {
    pub fn new(account: i64, operation_date: NaiveDate, amount: i64) -> Self {
        Self {
            account,
            operation_date,
            amount,
            label: None,
            operation_code: None,
            reference: None,
            operation_number: None,
        }
    }
}

/// The two source tables for one invocation.
///
/// `None` means the table was never provided, which is distinct from a
/// table that is present but has no rows for a given account.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    pub balances: Option<Vec<BalanceRecord>>,
    pub movements: Option<Vec<MovementRecord>>,
}

impl RecordStore {
    pub fn new(
        balances: Option<Vec<BalanceRecord>>,
        movements: Option<Vec<MovementRecord>>,
    ) -> Self {
        Self {
            balances,
            movements,
        }
    }

    pub fn balances(&self) -> &[BalanceRecord] {
        self.balances.as_deref().unwrap_or_default()
    }

    pub fn movements(&self) -> &[MovementRecord] {
        self.movements.as_deref().unwrap_or_default()
    }

    pub fn has_balances(&self) -> bool {
        self.balances.is_some()
    }

    pub fn has_movements(&self) -> bool {
        self.movements.is_some()
    }

    /// Distinct accounts found in either table, in ascending order.
    pub fn accounts(&self) -> Vec<i64> {
        let accounts: BTreeSet<i64> = self
            .balances()
            .iter()
            .map(|r| r.account)
            .chain(self.movements().iter().map(|r| r.account))
            .collect();
        accounts.into_iter().collect()
    }
}
