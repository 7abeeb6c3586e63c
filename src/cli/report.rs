use super::ui;
use crate::AppCommand;
use crate::core::analysis::{AccountReport, AnalysisParams, Analyzer, TurnoverPoint};
use crate::core::credit_line::CreditLineReport;
use crate::core::movements::MovementSummary;
use crate::core::outcome::Outcome;
use crate::core::overdraft::OverdraftReport;
use crate::core::turnover::TurnoverReport;
use crate::core::usage::UsageReport;
use anyhow::{Context, Result};
use comfy_table::Cell;
use serde::Serialize;

impl UsageReport {
    pub fn display_as_table(&self) -> String {
        let summary = ui::metrics_table(vec![
            ("Mean usage rate", ui::format_percent(self.mean_rate)),
            ("Maximum usage rate", ui::format_percent(self.max_rate)),
            ("Mean balance", ui::format_amount(self.mean_balance)),
            ("Credit limit", ui::format_amount(self.credit_limit)),
        ]);

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Balance"),
            ui::header_cell("Usage (%)"),
        ]);
        for day in &self.days {
            table.add_row(vec![
                Cell::new(day.date.to_string()),
                ui::signed_amount_cell(day.balance as f64),
                ui::value_cell(format!("{:.2}", day.usage_rate)),
            ]);
        }

        format!("{summary}\n{table}")
    }
}

impl TurnoverReport {
    pub fn display_as_table(&self) -> String {
        let summary = ui::metrics_table(vec![
            ("Routed turnover", ui::format_percent(self.turnover)),
            ("Total credit flow", ui::format_amount(self.total_credit_flow as f64)),
            ("Mean balance (3 months)", ui::format_amount(self.mean_balance)),
            (
                "Window",
                format!("{} to {}", self.window_start, self.window_end),
            ),
        ]);

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Balance"),
            ui::header_cell("Difference"),
            ui::header_cell("Credit flow"),
        ]);
        for day in &self.days {
            table.add_row(vec![
                Cell::new(day.date.to_string()),
                ui::signed_amount_cell(day.balance as f64),
                ui::format_optional_cell(day.difference, |d| ui::format_amount(d as f64)),
                ui::value_cell(ui::format_amount(day.credit_flow as f64)),
            ]);
        }

        format!(
            "{summary}\n{}\n{table}",
            ui::style_text(&self.band.to_string(), ui::StyleType::TotalLabel)
        )
    }
}

impl OverdraftReport {
    pub fn display_as_table(&self) -> String {
        let runs = if self.runs.is_empty() {
            "none".to_string()
        } else {
            self.runs
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let summary = ui::metrics_table(vec![
            (
                "Mean overdraft duration",
                format!("{:.2} months", self.mean_duration),
            ),
            ("Longest run", format!("{} months", self.longest_run)),
            ("Overdrawn months", self.overdrawn_months.to_string()),
            ("Runs", runs),
            ("Threshold", ui::format_amount(self.threshold)),
            (
                "Window",
                format!("{} to {}", self.window_start, self.window_end),
            ),
        ]);

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Month"),
            ui::header_cell("Mean balance"),
            ui::header_cell("Overdrawn"),
        ]);
        for month in &self.months {
            table.add_row(vec![
                Cell::new(month.month.to_string()),
                ui::signed_amount_cell(month.mean_balance),
                ui::flag_cell(month.below_threshold, true),
            ]);
        }

        format!("{summary}\n{table}")
    }
}

impl CreditLineReport {
    pub fn display_as_table(&self) -> String {
        let summary = ui::metrics_table(vec![
            (
                "Peak month",
                format!(
                    "{} ({})",
                    self.peak.month,
                    ui::format_amount(self.peak.mean_balance)
                ),
            ),
            ("Improving months", self.improvement_count.to_string()),
            (
                "Window",
                format!("{} to {}", self.window_start, self.window_end),
            ),
        ]);

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Month"),
            ui::header_cell("Mean balance"),
            ui::header_cell("Gap to peak"),
            ui::header_cell("Previous month"),
            ui::header_cell("Improved"),
        ]);
        for month in &self.months {
            table.add_row(vec![
                Cell::new(month.month.to_string()),
                ui::signed_amount_cell(month.mean_balance),
                ui::value_cell(ui::format_amount(month.gap_to_peak)),
                ui::format_optional_cell(month.previous_month_balance, ui::format_amount),
                ui::flag_cell(month.improved, false),
            ]);
        }

        format!("{summary}\n{table}")
    }
}

impl MovementSummary {
    pub fn display_as_table(&self) -> String {
        ui::metrics_table(vec![
            ("Operations", self.count.to_string()),
            ("Total amount", ui::format_amount(self.total_amount as f64)),
            ("Mean amount", ui::format_amount(self.mean_amount)),
        ])
        .to_string()
    }
}

fn display_history(points: &[TurnoverPoint]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Period"), ui::header_cell("Turnover")]);
    for point in points {
        let cell = match &point.turnover {
            Outcome::Computed { value } => ui::value_cell(ui::format_percent(*value)),
            Outcome::Unavailable { reason } => {
                Cell::new(reason.to_string()).fg(comfy_table::Color::DarkGrey)
            }
        };
        table.add_row(vec![Cell::new(point.period.to_string()), cell]);
    }
    table.to_string()
}

fn render_outcome<T>(
    outcome: &Outcome<T>,
    indicator: &str,
    render: impl Fn(&T) -> String,
) -> String {
    match outcome {
        Outcome::Computed { value } => render(value),
        Outcome::Unavailable { reason } => ui::unavailable_notice(indicator, *reason),
    }
}

fn section(title: &str, body: String) -> String {
    format!("\n{}\n{body}", ui::style_text(title, ui::StyleType::Section))
}

fn header(params: &AnalysisParams) -> String {
    format!(
        "Account: {}  Period: {}",
        ui::style_text(&params.account.to_string(), ui::StyleType::Title),
        ui::style_text(&params.period.to_string(), ui::StyleType::Title)
    )
}

impl AccountReport {
    pub fn display_as_table(&self) -> String {
        let mut output = ui::metrics_table(vec![
            ("Balance rows", self.balance_rows.to_string()),
            ("Movement rows", self.movement_rows.to_string()),
            ("Credit limit", ui::format_amount(self.credit_limit)),
            ("Overdraft threshold", ui::format_amount(self.overdraft_threshold)),
        ])
        .to_string();

        output.push_str(&section(
            "Usage rate",
            render_outcome(&self.usage, "the usage rate", UsageReport::display_as_table),
        ));
        output.push_str(&section(
            "Routed turnover",
            render_outcome(
                &self.turnover,
                "the routed turnover",
                TurnoverReport::display_as_table,
            ),
        ));
        if !self.turnover_history.is_empty() {
            output.push_str(&section(
                "Turnover history",
                display_history(&self.turnover_history),
            ));
        }
        output.push_str(&section(
            "Overdraft duration (12 months before period)",
            render_outcome(
                &self.overdraft,
                "the overdraft duration",
                OverdraftReport::display_as_table,
            ),
        ));
        output.push_str(&section(
            "Credit-line trend (12 months to period)",
            render_outcome(
                &self.credit_line,
                "the credit-line trend",
                CreditLineReport::display_as_table,
            ),
        ));
        output.push_str(&section(
            "Movements",
            render_outcome(
                &self.movements,
                "movement statistics",
                MovementSummary::display_as_table,
            ),
        ));
        output
    }
}

/// The JSON form printed by `--json`.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize result")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", to_json(value)?);
    Ok(())
}

fn print_outcome<T: Serialize>(
    params: &AnalysisParams,
    outcome: &Outcome<T>,
    indicator: &str,
    render: impl Fn(&T) -> String,
    json: bool,
) -> Result<()> {
    if json {
        return print_json(outcome);
    }
    println!("{}\n", header(params));
    println!("{}", render_outcome(outcome, indicator, render));
    Ok(())
}

/// Computes and prints the indicator selected by `command`.
pub async fn run(
    command: &AppCommand,
    analyzer: &Analyzer,
    params: &AnalysisParams,
    json: bool,
) -> Result<()> {
    let AnalysisParams {
        account, period, ..
    } = *params;

    match command {
        AppCommand::Usage => {
            let outcome = analyzer
                .usage(account, period, params.credit_limit)
                .await?;
            print_outcome(
                params,
                &outcome,
                "the usage rate",
                UsageReport::display_as_table,
                json,
            )
        }
        AppCommand::Turnover => {
            let outcome = analyzer.turnover(account, period).await?;
            print_outcome(
                params,
                &outcome,
                "the routed turnover",
                TurnoverReport::display_as_table,
                json,
            )
        }
        AppCommand::Overdraft => {
            let outcome = analyzer
                .overdraft(account, period, params.overdraft_threshold)
                .await?;
            print_outcome(
                params,
                &outcome,
                "the overdraft duration",
                OverdraftReport::display_as_table,
                json,
            )
        }
        AppCommand::CreditLine => {
            let outcome = analyzer.credit_line(account, period).await?;
            print_outcome(
                params,
                &outcome,
                "the credit-line trend",
                CreditLineReport::display_as_table,
                json,
            )
        }
        AppCommand::Movements => {
            let outcome = analyzer.movements(account, period);
            print_outcome(
                params,
                &outcome,
                "movement statistics",
                MovementSummary::display_as_table,
                json,
            )
        }
        AppCommand::Report => {
            let report = analyzer.report(params).await?;
            if json {
                return print_json(&report);
            }
            println!("{}\n", header(params));
            println!("{}", report.display_as_table());
            ui::print_separator();
            Ok(())
        }
        AppCommand::Accounts => super::accounts::run(analyzer, json),
    }
}
