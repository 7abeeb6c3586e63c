//! Entry point tying the calculators to a loaded record store.
//!
//! The calculators in the sibling modules are pure; [`Analyzer`] adds
//! memoization keyed by the source fingerprint and the request parameters.

use super::cache::Cache;
use super::credit_line::{CreditLineReport, credit_line_trend};
use super::error::{AnalysisError, Result};
use super::filter::{PeriodSlice, filter_by_period};
use super::movements::{MovementSummary, summarize_movements};
use super::outcome::Outcome;
use super::overdraft::{OverdraftReport, overdraft_duration};
use super::period::YearMonth;
use super::records::RecordStore;
use super::turnover::{TurnoverReport, routed_turnover};
use super::usage::{UsageReport, usage_rate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Identifies one memoized computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalysisKey {
    pub source: u64,
    pub account: i64,
    pub period: YearMonth,
    /// Bit pattern of the numeric parameter (credit limit or threshold), if any.
    pub parameter: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    pub account: i64,
    pub period: YearMonth,
    pub credit_limit: f64,
    pub overdraft_threshold: f64,
    /// Number of trailing months for the turnover history, target month included.
    pub history_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverPoint {
    pub period: YearMonth,
    pub turnover: Outcome<f64>,
}

/// Every indicator for one account and period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountReport {
    pub account: i64,
    pub period: YearMonth,
    pub balance_rows: usize,
    pub movement_rows: usize,
    pub credit_limit: f64,
    pub overdraft_threshold: f64,
    pub usage: Outcome<UsageReport>,
    pub turnover: Outcome<TurnoverReport>,
    pub turnover_history: Vec<TurnoverPoint>,
    pub overdraft: Outcome<OverdraftReport>,
    pub credit_line: Outcome<CreditLineReport>,
    pub movements: Outcome<MovementSummary>,
}

pub struct Analyzer {
    store: Arc<RecordStore>,
    fingerprint: u64,
    usage_cache: Cache<AnalysisKey, Outcome<UsageReport>>,
    turnover_cache: Cache<AnalysisKey, Outcome<TurnoverReport>>,
    overdraft_cache: Cache<AnalysisKey, Outcome<OverdraftReport>>,
    credit_line_cache: Cache<AnalysisKey, Outcome<CreditLineReport>>,
}

impl Analyzer {
    pub fn new(store: RecordStore, fingerprint: u64) -> Self {
        Self {
            store: Arc::new(store),
            fingerprint,
            usage_cache: Cache::new(),
            turnover_cache: Cache::new(),
            overdraft_cache: Cache::new(),
            credit_line_cache: Cache::new(),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn accounts(&self) -> Vec<i64> {
        self.store.accounts()
    }

    pub fn period_slice(&self, account: i64, period: YearMonth) -> PeriodSlice {
        filter_by_period(&self.store, account, period)
    }

    fn key(&self, account: i64, period: YearMonth, parameter: Option<f64>) -> AnalysisKey {
        AnalysisKey {
            source: self.fingerprint,
            account,
            period,
            parameter: parameter.map(f64::to_bits),
        }
    }

    pub async fn usage(
        &self,
        account: i64,
        period: YearMonth,
        credit_limit: f64,
    ) -> Result<Outcome<UsageReport>> {
        let key = self.key(account, period, Some(credit_limit));
        self.usage_cache
            .get_or_try_insert_with(key, || async {
                let slice = self.period_slice(account, period);
                usage_rate(&slice.balances, credit_limit)
            })
            .await
    }

    pub async fn turnover(&self, account: i64, period: YearMonth) -> Result<Outcome<TurnoverReport>> {
        let key = self.key(account, period, None);
        self.turnover_cache
            .get_or_try_insert_with(key, || async {
                routed_turnover(self.store.balances(), account, period)
            })
            .await
    }

    pub async fn overdraft(
        &self,
        account: i64,
        period: YearMonth,
        threshold: f64,
    ) -> Result<Outcome<OverdraftReport>> {
        let key = self.key(account, period, Some(threshold));
        self.overdraft_cache
            .get_or_try_insert_with(key, || async {
                overdraft_duration(self.store.balances(), account, period, threshold)
            })
            .await
    }

    pub async fn credit_line(
        &self,
        account: i64,
        period: YearMonth,
    ) -> Result<Outcome<CreditLineReport>> {
        let key = self.key(account, period, None);
        self.credit_line_cache
            .get_or_try_insert_with(key, || async {
                credit_line_trend(self.store.balances(), account, period)
            })
            .await
    }

    pub fn movements(&self, account: i64, period: YearMonth) -> Outcome<MovementSummary> {
        summarize_movements(&self.period_slice(account, period).movements)
    }

    /// Turnover for the `months` periods ending at `period`, oldest first.
    pub async fn turnover_history(
        &self,
        account: i64,
        period: YearMonth,
        months: u32,
    ) -> Result<Vec<TurnoverPoint>> {
        let months = i32::try_from(months)
            .map_err(|_| AnalysisError::InvalidPeriod(format!("history of {months} months")))?;
        let mut points = Vec::new();
        for offset in (0..months).rev() {
            let point_period = period.shift(-offset)?;
            let outcome = self.turnover(account, point_period).await?;
            points.push(TurnoverPoint {
                period: point_period,
                turnover: outcome.map(|report| report.turnover),
            });
        }
        Ok(points)
    }

    pub async fn report(&self, params: &AnalysisParams) -> Result<AccountReport> {
        let AnalysisParams {
            account,
            period,
            credit_limit,
            overdraft_threshold,
            history_months,
        } = *params;
        info!(account, %period, "Building account report");

        let slice = self.period_slice(account, period);
        let (usage, overdraft, credit_line) = futures::try_join!(
            self.usage(account, period, credit_limit),
            self.overdraft(account, period, overdraft_threshold),
            self.credit_line(account, period),
        )?;
        // Sequential: both read the turnover cache.
        let turnover = self.turnover(account, period).await?;
        let turnover_history = self
            .turnover_history(account, period, history_months)
            .await?;
        let movements = summarize_movements(&slice.movements);

        let (hits, misses) = self.turnover_cache.stats().await;
        debug!(hits, misses, "Turnover cache usage");

        Ok(AccountReport {
            account,
            period,
            balance_rows: slice.balances.len(),
            movement_rows: slice.movements.len(),
            credit_limit,
            overdraft_threshold,
            usage,
            turnover,
            turnover_history,
            overdraft,
            credit_line,
            movements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::Unavailable;
    use crate::core::records::{BalanceRecord, MovementRecord};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bal(account: i64, d: NaiveDate, balance: i64) -> BalanceRecord {
        BalanceRecord {
            account,
            position_date: d,
            balance,
        }
    }

    fn params(account: i64) -> AnalysisParams {
        AnalysisParams {
            account,
            period: YearMonth::new(2024, 3).unwrap(),
            credit_limit: 1000.0,
            overdraft_threshold: 0.0,
            history_months: 3,
        }
    }

    fn sample_analyzer() -> Analyzer {
        let balances = vec![
            bal(1, date(2023, 11, 15), -200),
            bal(1, date(2023, 12, 15), -100),
            bal(1, date(2024, 1, 15), 400),
            bal(1, date(2024, 2, 15), 600),
            bal(1, date(2024, 3, 1), 100),
            bal(1, date(2024, 3, 2), 200),
            bal(1, date(2024, 3, 3), 150),
        ];
        let movements = vec![
            MovementRecord::new(1, date(2024, 3, 2), 100),
            MovementRecord::new(1, date(2024, 3, 3), -50),
        ];
        Analyzer::new(RecordStore::new(Some(balances), Some(movements)), 0xfeed)
    }

    #[tokio::test]
    async fn test_report_combines_all_indicators() {
        let analyzer = sample_analyzer();
        let report = analyzer.report(&params(1)).await.unwrap();

        assert_eq!(report.balance_rows, 3);
        assert_eq!(report.movement_rows, 2);
        assert_eq!(report.usage.value().unwrap().mean_rate, 15.0);
        assert!(report.turnover.is_computed());
        assert_eq!(report.turnover_history.len(), 3);
        assert_eq!(
            report.turnover_history.last().unwrap().period,
            YearMonth::new(2024, 3).unwrap()
        );

        let overdraft = report.overdraft.value().unwrap();
        assert_eq!(overdraft.runs, vec![2]);
        assert_eq!(overdraft.mean_duration, 2.0);

        let credit_line = report.credit_line.value().unwrap();
        assert_eq!(credit_line.months.len(), 5);
        assert_eq!(credit_line.improvement_count, 3);

        assert_eq!(report.movements.value().unwrap().total_amount, 50);
    }

    #[tokio::test]
    async fn test_empty_account_yields_sentinels_only() {
        let analyzer = sample_analyzer();
        let report = analyzer.report(&params(999)).await.unwrap();

        assert_eq!(report.usage.reason(), Some(Unavailable::NoData));
        assert_eq!(report.turnover.reason(), Some(Unavailable::InsufficientData));
        assert_eq!(report.overdraft.reason(), Some(Unavailable::NoData));
        assert_eq!(report.credit_line.reason(), Some(Unavailable::EmptyWindow));
        assert_eq!(report.movements.reason(), Some(Unavailable::NoData));
        assert!(report.turnover_history.iter().all(|p| !p.turnover.is_computed()));
    }

    #[tokio::test]
    async fn test_absent_tables_yield_sentinels() {
        let analyzer = Analyzer::new(RecordStore::default(), 0);
        let report = analyzer.report(&params(1)).await.unwrap();
        assert!(!report.usage.is_computed());
        assert!(!report.turnover.is_computed());
        assert!(!report.overdraft.is_computed());
        assert!(!report.credit_line.is_computed());
        assert!(!report.movements.is_computed());
    }

    #[tokio::test]
    async fn test_invalid_credit_limit_is_an_error() {
        let analyzer = sample_analyzer();
        let mut bad = params(1);
        bad.credit_limit = 0.0;
        assert_eq!(
            analyzer.report(&bad).await.unwrap_err(),
            AnalysisError::InvalidCreditLimit(0.0)
        );
    }

    #[tokio::test]
    async fn test_turnover_is_memoized() {
        let analyzer = sample_analyzer();
        let period = YearMonth::new(2024, 3).unwrap();

        let first = analyzer.turnover(1, period).await.unwrap();
        let second = analyzer.turnover(1, period).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(analyzer.turnover_cache.stats().await, (1, 1));

        // The report reuses the entry computed above for the target month.
        analyzer.report(&params(1)).await.unwrap();
        let (hits, _) = analyzer.turnover_cache.stats().await;
        assert!(hits >= 3);
    }
}
