use super::ui;
use crate::core::analysis::Analyzer;
use anyhow::{Context, Result};
use comfy_table::Cell;

/// Lists the accounts present in the loaded tables.
pub fn run(analyzer: &Analyzer, json: bool) -> Result<()> {
    let accounts = analyzer.accounts();

    if json {
        let out = serde_json::to_string_pretty(&accounts).context("Failed to serialize accounts")?;
        println!("{out}");
        return Ok(());
    }

    if accounts.is_empty() {
        println!("No accounts found in the source tables.");
        return Ok(());
    }

    let store = analyzer.store();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Account"),
        ui::header_cell("Balance rows"),
        ui::header_cell("Movement rows"),
    ]);
    for account in &accounts {
        let balance_rows = store
            .balances()
            .iter()
            .filter(|r| r.account == *account)
            .count();
        let movement_rows = store
            .movements()
            .iter()
            .filter(|r| r.account == *account)
            .count();
        table.add_row(vec![
            Cell::new(account),
            ui::value_cell(balance_rows.to_string()),
            ui::value_cell(movement_rows.to_string()),
        ]);
    }

    println!("{table}");
    println!(
        "{} {}",
        ui::style_text("Accounts:", ui::StyleType::TotalLabel),
        accounts.len()
    );
    Ok(())
}
