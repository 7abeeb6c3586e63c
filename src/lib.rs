pub mod cli;
pub mod core;
pub mod ingest;

use crate::core::config::{AnalysisConfig, AppConfig};
use crate::core::{AnalysisParams, Analyzer, YearMonth};
use crate::ingest::{CsvSource, RecordSource};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    Accounts,
    Usage,
    Turnover,
    Overdraft,
    CreditLine,
    Movements,
    Report,
}

/// Command-line overrides; `None` falls back to the configuration file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_path: Option<String>,
    pub balances: Option<PathBuf>,
    pub movements: Option<PathBuf>,
    pub account: Option<i64>,
    pub period: Option<YearMonth>,
    pub credit_limit: Option<f64>,
    pub overdraft_threshold: Option<f64>,
    pub history_months: Option<u32>,
    pub json: bool,
}

fn current_period() -> YearMonth {
    YearMonth::from_date(chrono::Local::now().date_naive())
}

/// Loads the configuration and the source tables it names, with `options`
/// overriding both.
pub async fn load_analyzer(options: &RunOptions) -> Result<(Analyzer, AnalysisConfig)> {
    let mut config = AppConfig::load_or_default(options.config_path.as_deref())?;
    if let Some(path) = &options.balances {
        config.sources.balances = Some(path.clone());
    }
    if let Some(path) = &options.movements {
        config.sources.movements = Some(path.clone());
    }
    debug!("Loaded config: {config:#?}");

    if config.sources.balances.is_none() && config.sources.movements.is_none() {
        anyhow::bail!(
            "No source tables configured; set `sources` in the config file or pass --balances/--movements"
        );
    }

    let source = CsvSource::new(config.sources.balances, config.sources.movements);
    let pb = cli::ui::new_spinner("Loading source tables...");
    let loaded = source.load().await;
    pb.finish_and_clear();
    let loaded = loaded.context("Failed to load source tables")?;

    Ok((Analyzer::new(loaded.store, loaded.fingerprint), config.analysis))
}

pub fn analysis_params(options: &RunOptions, defaults: &AnalysisConfig) -> Result<AnalysisParams> {
    let account = options
        .account
        .context("An account is required for this command (--account)")?;
    Ok(AnalysisParams {
        account,
        period: options.period.unwrap_or_else(current_period),
        credit_limit: options.credit_limit.unwrap_or(defaults.credit_limit),
        overdraft_threshold: options
            .overdraft_threshold
            .unwrap_or(defaults.overdraft_threshold),
        history_months: options.history_months.unwrap_or(defaults.history_months),
    })
}

pub async fn run_command(command: AppCommand, options: &RunOptions) -> Result<()> {
    info!("acctpulse starting...");

    let (analyzer, defaults) = load_analyzer(options).await?;

    if command == AppCommand::Accounts {
        return cli::accounts::run(&analyzer, options.json);
    }

    let params = analysis_params(options, &defaults)?;
    debug!(?params, "Running analysis");

    cli::report::run(&command, &analyzer, &params, options.json).await
}
