use crate::core::rates::RefreshHandle;
use crate::core::RateSnapshot;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Negative,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Negative => style(text).red().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
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

/// Right aligned cell for money and rates.
pub fn amount_cell(text: impl Into<String>) -> Cell {
    Cell::new(text.into()).set_alignment(CellAlignment::Right)
}

/// Placeholder for a value that has nothing to show.
pub fn empty_cell() -> Cell {
    Cell::new("-")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

/// Waits for a rate refresh behind a spinner. Returns the committed snapshot.
pub async fn wait_for_refresh(handle: Option<RefreshHandle>) -> Option<RateSnapshot> {
    let handle = handle?;
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Fetching exchange rates...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = handle.await;
    spinner.finish_and_clear();
    result
}

/// Line shown when conversions are running without matching rates.
pub fn stale_notice(base: &str) -> String {
    style_text(
        &format!("Exchange rates for {base} are unavailable; amounts in other currencies are shown unconverted."),
        StyleType::Error,
    )
}

/// Line shown when preferences and rates cannot be saved for this run.
pub fn memory_store_notice(data_path: &std::path::Path) -> String {
    style_text(
        &format!(
            "Could not open the data store at {}; base currency and rates will not be saved.",
            data_path.display()
        ),
        StyleType::Error,
    )
}
