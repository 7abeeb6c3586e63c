//! CSV extracts of the balance and movement tables.
//!
//! Column names follow either the plain English headers
//! (`account,position_date,balance`) or the bank export headers
//! (`COMPTE,DATPOS,SOLDE`). Comma and semicolon delimiters are both accepted.

use super::error::{IngestError, Result};
use super::{LoadedSources, RecordSource, fingerprint};
use crate::core::records::{BalanceRecord, MovementRecord, RecordStore};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Deserialize)]
struct BalanceRow {
    #[serde(alias = "COMPTE")]
    account: String,
    #[serde(alias = "DATPOS")]
    position_date: String,
    #[serde(alias = "SOLDE")]
    balance: String,
}

#[derive(Deserialize)]
struct MovementRow {
    #[serde(alias = "COMPTE")]
    account: String,
    #[serde(alias = "DATOPER")]
    operation_date: String,
    #[serde(alias = "MNTDEV")]
    amount: String,
    #[serde(alias = "LIBELLE")]
    label: Option<String>,
    #[serde(alias = "CODOPSC")]
    operation_code: Option<String>,
    #[serde(alias = "REFREL")]
    reference: Option<String>,
    #[serde(alias = "NOOPER")]
    operation_number: Option<String>,
}

/// Reads the two tables from CSV files. A `None` path is an absent table.
#[derive(Debug, Clone, Default)]
pub struct CsvSource {
    balances_path: Option<PathBuf>,
    movements_path: Option<PathBuf>,
}

impl CsvSource {
    pub fn new(balances_path: Option<PathBuf>, movements_path: Option<PathBuf>) -> Self {
        Self {
            balances_path,
            movements_path,
        }
    }
}

async fn read_optional(path: Option<&Path>) -> Result<Option<Vec<u8>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    debug!("Reading {}", path.display());
    tokio::fs::read(path)
        .await
        .map(Some)
        .map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl RecordSource for CsvSource {
    async fn load(&self) -> Result<LoadedSources> {
        let (balance_bytes, movement_bytes) = futures::try_join!(
            read_optional(self.balances_path.as_deref()),
            read_optional(self.movements_path.as_deref()),
        )?;

        let fingerprint = fingerprint(&[balance_bytes.as_deref(), movement_bytes.as_deref()]);
        let balances = balance_bytes
            .as_deref()
            .map(parse_balances)
            .transpose()?;
        let movements = movement_bytes
            .as_deref()
            .map(parse_movements)
            .transpose()?;

        info!(
            balances = balances.as_ref().map(Vec::len),
            movements = movements.as_ref().map(Vec::len),
            "Loaded source tables"
        );

        Ok(LoadedSources {
            store: RecordStore::new(balances, movements),
            fingerprint,
        })
    }
}

fn detect_delimiter(data: &[u8]) -> u8 {
    let header = data.split(|b| *b == b'\n').next().unwrap_or_default();
    let semicolons = header.iter().filter(|b| **b == b';').count();
    let commas = header.iter().filter(|b| **b == b',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Parses rows of type `T` and maps each one with its source line number.
fn parse_rows<T, U>(data: &[u8], mut convert: impl FnMut(T, u64) -> Result<U>) -> Result<Vec<U>>
where
    T: for<'de> Deserialize<'de>,
{
    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(data))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(data);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line());
        let row: T = record.deserialize(Some(&headers))?;
        rows.push(convert(row, line)?);
    }
    Ok(rows)
}

pub fn parse_balances(data: &[u8]) -> Result<Vec<BalanceRecord>> {
    parse_rows(data, |row: BalanceRow, line| {
        Ok(BalanceRecord {
            account: parse_integer(&row.account, "account", line)?,
            position_date: parse_date(&row.position_date, "position_date", line)?,
            balance: parse_integer(&row.balance, "balance", line)?,
        })
    })
}

pub fn parse_movements(data: &[u8]) -> Result<Vec<MovementRecord>> {
    parse_rows(data, |row: MovementRow, line| {
        Ok(MovementRecord {
            account: parse_integer(&row.account, "account", line)?,
            operation_date: parse_date(&row.operation_date, "operation_date", line)?,
            amount: parse_integer(&row.amount, "amount", line)?,
            label: non_empty(row.label),
            operation_code: non_empty(row.operation_code),
            reference: non_empty(row.reference),
            operation_number: non_empty(row.operation_number),
        })
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn invalid(column: &'static str, value: &str, line: u64) -> IngestError {
    IngestError::InvalidField {
        column,
        value: value.to_string(),
        line,
    }
}

/// Accepts plain integers and whole-valued decimals such as `1200.0`.
fn parse_integer(raw: &str, column: &'static str, line: u64) -> Result<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => Ok(value as i64),
        _ => Err(invalid(column, raw, line)),
    }
}

fn parse_date(raw: &str, column: &'static str, line: u64) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| invalid(column, raw, line))
}
