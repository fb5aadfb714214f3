use super::ui;
use crate::core::{FxContext, RateSnapshot, RatesFreshness};
use anyhow::Result;
use comfy_table::Cell;

fn describe_freshness(freshness: &RatesFreshness) -> String {
    let source = match (&freshness.snapshot_base, &freshness.as_of) {
        (Some(base), Some(as_of)) => format!("{base} rates as of {as_of}"),
        (Some(base), None) => format!("{base} rates, date not reported"),
        (None, _) => "no rates cached".to_string(),
    };
    let state = if freshness.stale { "stale" } else { "fresh" };
    format!(
        "Base currency: {} ({source}, {state})",
        ui::style_text(freshness.base, ui::StyleType::TotalLabel)
    )
}

pub fn render(freshness: &RatesFreshness, snapshot: Option<&RateSnapshot>) -> String {
    let mut output = describe_freshness(freshness);
    let Some(snapshot) = snapshot.filter(|s| s.has_rates()) else {
        output.push_str("\n\n");
        output.push_str(&ui::stale_notice(freshness.base));
        return output;
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {}", snapshot.base)),
        ui::header_cell(&format!("100 {}", snapshot.base)),
    ]);
    let mut codes: Vec<&String> = snapshot.rates.keys().collect();
    codes.sort();
    for code in codes {
        match snapshot.rate(code) {
            Some(rate) => table.add_row(vec![
                Cell::new(code),
                ui::amount_cell(format!("{rate:.6}")),
                ui::amount_cell(crate::core::format::format_raw(100.0 * rate, code)),
            ]),
            None => table.add_row(vec![Cell::new(code), ui::empty_cell(), ui::empty_cell()]),
        };
    }
    output.push_str("\n\n");
    output.push_str(&table.to_string());

    if freshness.stale {
        output.push_str("\n\n");
        output.push_str(&ui::stale_notice(freshness.base));
    }
    output
}

pub async fn run(ctx: &FxContext) -> Result<()> {
    ui::wait_for_refresh(ctx.ensure_fresh()).await;
    let snapshot = ctx.snapshot();
    println!("{}", render(&ctx.rates_freshness(), snapshot.as_ref()));
    Ok(())
}
