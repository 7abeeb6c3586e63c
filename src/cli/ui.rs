use crate::core::outcome::Unavailable;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Section,
    TotalLabel,
    Warning,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Section => style(text).cyan().bold(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::Warning => style(text).yellow(),
    };
    styled.to_string()
}

/// Non-fatal notice shown in place of an indicator that could not be computed.
pub fn unavailable_notice(indicator: &str, reason: Unavailable) -> String {
    style_text(
        &format!("! Unable to compute {indicator}: {reason}"),
        StyleType::Warning,
    )
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Two-column label/value table for headline figures.
pub fn metrics_table(rows: Vec<(&str, String)>) -> Table {
    let mut table = new_styled_table();
    for (label, value) in rows {
        table.add_row(vec![
            Cell::new(label).add_attribute(Attribute::Bold),
            value_cell(value),
        ]);
    }
    table
}

pub fn value_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "N/A".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

/// Amount cell coloured by sign.
pub fn signed_amount_cell(value: f64) -> Cell {
    let cell = Cell::new(format_amount(value)).set_alignment(CellAlignment::Right);
    if value < 0.0 {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

/// Yes/no cell; `alert` picks whether "yes" is rendered as bad news.
pub fn flag_cell(flag: bool, alert: bool) -> Cell {
    let (text, color) = match (flag, alert) {
        (true, true) => ("yes", Color::Red),
        (true, false) => ("yes", Color::Green),
        (false, _) => ("no", Color::DarkGrey),
    };
    Cell::new(text)
        .fg(color)
        .set_alignment(CellAlignment::Center)
}

/// Rounds to whole units and groups thousands with commas.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Creates a spinner shown while source tables are read.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
