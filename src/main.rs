use acctpulse::core::YearMonth;
use acctpulse::core::log::init_logging;
use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Daily balances CSV file (overrides the config file)
    #[arg(long, global = true)]
    balances: Option<PathBuf>,

    /// Movements CSV file (overrides the config file)
    #[arg(long, global = true)]
    movements: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct Target {
    /// Account identifier
    #[arg(short, long)]
    account: i64,

    /// Period to analyse as YYYY-MM (defaults to the current month)
    #[arg(short, long)]
    period: Option<YearMonth>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List accounts found in the source tables
    Accounts,
    /// Credit usage rate for the period
    Usage {
        #[command(flatten)]
        target: Target,
        /// Credit limit (overrides the config file)
        #[arg(long)]
        credit_limit: Option<f64>,
    },
    /// Routed turnover over the three months ending with the period
    Turnover {
        #[command(flatten)]
        target: Target,
    },
    /// Mean overdraft duration over the twelve months before the period
    Overdraft {
        #[command(flatten)]
        target: Target,
        /// Overdraft threshold (overrides the config file)
        #[arg(long, allow_hyphen_values = true)]
        threshold: Option<f64>,
    },
    /// Peak gap and improving months over the twelve months ending with the period
    CreditLine {
        #[command(flatten)]
        target: Target,
    },
    /// Movement statistics for the period
    Movements {
        #[command(flatten)]
        target: Target,
    },
    /// All indicators for the period
    Report {
        #[command(flatten)]
        target: Target,
        /// Credit limit (overrides the config file)
        #[arg(long)]
        credit_limit: Option<f64>,
        /// Overdraft threshold (overrides the config file)
        #[arg(long, allow_hyphen_values = true)]
        threshold: Option<f64>,
        /// Months of turnover history (overrides the config file)
        #[arg(long)]
        history: Option<u32>,
    },
}

impl Commands {
    fn into_parts(self, options: &mut acctpulse::RunOptions) -> acctpulse::AppCommand {
        use acctpulse::AppCommand;

        let (command, target) = match self {
            Commands::Setup => unreachable!("Setup command should be handled separately"),
            Commands::Accounts => (AppCommand::Accounts, None),
            Commands::Usage {
                target,
                credit_limit,
            } => {
                options.credit_limit = credit_limit;
                (AppCommand::Usage, Some(target))
            }
            Commands::Turnover { target } => (AppCommand::Turnover, Some(target)),
            Commands::Overdraft { target, threshold } => {
                options.overdraft_threshold = threshold;
                (AppCommand::Overdraft, Some(target))
            }
            Commands::CreditLine { target } => (AppCommand::CreditLine, Some(target)),
            Commands::Movements { target } => (AppCommand::Movements, Some(target)),
            Commands::Report {
                target,
                credit_limit,
                threshold,
                history,
            } => {
                options.credit_limit = credit_limit;
                options.overdraft_threshold = threshold;
                options.history_months = history;
                (AppCommand::Report, Some(target))
            }
        };

        if let Some(target) = target {
            options.account = Some(target.account);
            options.period = target.period;
        }
        command
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let result = match cli.command {
        Some(Commands::Setup) => acctpulse::cli::setup::setup(),
        Some(cmd) => {
            let mut options = acctpulse::RunOptions {
                config_path: cli.config_path,
                balances: cli.balances,
                movements: cli.movements,
                json: cli.json,
                ..Default::default()
            };
            let command = cmd.into_parts(&mut options);
            acctpulse::run_command(command, &options).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
