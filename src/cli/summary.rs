use super::ui;
use crate::core::FxContext;
use crate::core::ledger::{CurrencyTotals, Ledger, converted_total, is_valid_month};
use anyhow::{Result, bail};
use comfy_table::Cell;
use std::collections::BTreeSet;

/// Monthly totals, kept per currency and also converted into the base.
#[derive(Debug)]
pub struct MonthSummary {
    pub month: String,
    pub base: &'static str,
    pub income: CurrencyTotals,
    pub expenses: CurrencyTotals,
    pub categories: Vec<(String, CurrencyTotals)>,
    pub income_total: f64,
    pub expense_total: f64,
    pub rates_stale: bool,
}

impl MonthSummary {
    pub fn build(ledger: &Ledger, ctx: &FxContext, month: &str) -> Self {
        let to_base = |amount: f64, code: &str| ctx.convert(amount, code, None);
        let income = ledger.income_totals_by_currency(month);
        let expenses = ledger.expense_totals_by_currency(month);
        let by_category = ledger.expense_totals_by_category(month);
        let categories = ledger
            .categories()
            .iter()
            .map(|c| {
                let totals = by_category.get(&c.id).cloned().unwrap_or_default();
                (c.name.clone(), totals)
            })
            .collect();

        MonthSummary {
            month: month.to_string(),
            base: ctx.base_currency().code,
            income_total: converted_total(&income, to_base),
            expense_total: converted_total(&expenses, to_base),
            income,
            expenses,
            categories,
            rates_stale: ctx.is_stale(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.income_total - self.expense_total
    }

    pub fn display_as_table(&self, ctx: &FxContext) -> String {
        let base = self.base;
        let format_base = |amount: f64| ctx.format(amount, Some(base));

        let mut currencies = ui::new_styled_table();
        currencies.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Income"),
            ui::header_cell("Expenses"),
            ui::header_cell(&format!("Net ({base})")),
        ]);
        let codes: BTreeSet<&String> = self.income.keys().chain(self.expenses.keys()).collect();
        for code in codes {
            let income = self.income.get(code).copied().unwrap_or_default();
            let spent = self.expenses.get(code).copied().unwrap_or_default();
            currencies.add_row(vec![
                Cell::new(code),
                ui::amount_cell(ctx.format_raw(income, code)),
                ui::amount_cell(ctx.format_raw(spent, code)),
                ui::amount_cell(format_base(ctx.convert(income - spent, code, None))),
            ]);
        }

        let mut categories = ui::new_styled_table();
        categories.set_header(vec![
            ui::header_cell("Category"),
            ui::header_cell("Spent"),
            ui::header_cell(&format!("Spent ({base})")),
        ]);
        for (name, totals) in &self.categories {
            if totals.is_empty() {
                categories.add_row(vec![Cell::new(name), ui::empty_cell(), ui::empty_cell()]);
                continue;
            }
            let spent = totals
                .iter()
                .map(|(code, amount)| ctx.format_raw(*amount, code))
                .collect::<Vec<_>>()
                .join("\n");
            let in_base = converted_total(totals, |amount, code| ctx.convert(amount, code, None));
            categories.add_row(vec![
                Cell::new(name),
                ui::amount_cell(spent),
                ui::amount_cell(format_base(in_base)),
            ]);
        }

        let mut output = format!(
            "Month: {}\n\n",
            ui::style_text(&self.month, ui::StyleType::Title)
        );
        if self.income.is_empty() && self.expenses.is_empty() {
            output.push_str(&ui::style_text(
                "No income or expenses recorded for this month.",
                ui::StyleType::Subtle,
            ));
            output.push('\n');
        } else {
            output.push_str(&currencies.to_string());
            output.push_str("\n\n");
        }
        output.push_str(&categories.to_string());
        output.push_str("\n\n");

        let balance = self.balance();
        let balance_style = if balance < 0.0 {
            ui::StyleType::Negative
        } else {
            ui::StyleType::TotalValue
        };
        output.push_str(&format!(
            "{} {}\n{} {}\n{} {}",
            ui::style_text(&format!("Total income ({base}):"), ui::StyleType::TotalLabel),
            ui::style_text(&format_base(self.income_total), ui::StyleType::TotalValue),
            ui::style_text(&format!("Total expenses ({base}):"), ui::StyleType::TotalLabel),
            ui::style_text(&format_base(self.expense_total), ui::StyleType::TotalValue),
            ui::style_text(&format!("Balance ({base}):"), ui::StyleType::TotalLabel),
            ui::style_text(&format_base(balance), balance_style),
        ));

        if self.rates_stale {
            output.push_str("\n\n");
            output.push_str(&ui::stale_notice(base));
        }
        output
    }
}

pub async fn run(ledger: &Ledger, ctx: &FxContext, month: &str) -> Result<()> {
    if !is_valid_month(month) {
        bail!("Invalid month '{month}', expected YYYY-MM");
    }
    ui::wait_for_refresh(ctx.ensure_fresh()).await;

    let summary = MonthSummary::build(ledger, ctx, month);
    println!("{}", summary.display_as_table(ctx));
    Ok(())
}
