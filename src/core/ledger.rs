//! Monthly income and expense bookkeeping.
//!
//! Totals are kept per currency; converting them into the base currency is
//! left to the caller so the numbers stay exact when no rates are available.

use crate::core::config::{CategoryConfig, ExpenseConfig, IncomeConfig};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

pub const DEFAULT_EXPENSE_CURRENCY: &str = "GEL";
pub const DEFAULT_INCOME_CURRENCY: &str = "USD";

/// Per-currency sums, ordered by currency code.
pub type CurrencyTotals = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseEntry {
    pub category_id: String,
    pub amount: f64,
    pub currency: String,
    pub month: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncomeSource {
    pub name: String,
    pub category: String,
    pub amount: f64,
    pub currency: String,
    pub month: String,
}

/// Lower-cased, trimmed, whitespace runs collapsed into `-`.
pub fn slugify_category_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Accepts `YYYY-MM`.
pub fn is_valid_month(month: &str) -> bool {
    month.len() == 7 && NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").is_ok()
}

pub fn current_month() -> String {
    chrono::Local::now().format("%Y-%m").to_string()
}

fn normalize_currency(code: Option<&str>, default: &str) -> String {
    code.map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(default)
        .to_uppercase()
}

fn default_categories() -> Vec<Category> {
    [
        ("bank-payments", "Bank Payments"),
        ("food", "Food"),
        ("unexpected-expenses", "Unexpected expenses"),
    ]
    .into_iter()
    .map(|(id, name)| Category {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    categories: Vec<Category>,
    expenses: Vec<ExpenseEntry>,
    incomes: Vec<IncomeSource>,
}

impl Ledger {
    /// Starts with the default expense categories.
    pub fn new() -> Self {
        Self {
            categories: default_categories(),
            ..Default::default()
        }
    }

    /// Builds a ledger from configuration rows, skipping rows that do not
    /// validate. Configured categories replace the defaults.
    pub fn from_config(
        categories: &[CategoryConfig],
        expenses: &[ExpenseConfig],
        incomes: &[IncomeConfig],
    ) -> Self {
        let mut ledger = if categories.is_empty() {
            Self::new()
        } else {
            Self::default()
        };
        for category in categories {
            ledger.add_category(&category.name);
        }
        for expense in expenses {
            if !ledger.add_expense(
                &expense.category,
                expense.amount,
                expense.currency.as_deref(),
                &expense.month,
            ) {
                warn!(
                    "Skipping expense {} {:?} in {} for category {}",
                    expense.amount, expense.currency, expense.month, expense.category
                );
            }
        }
        for income in incomes {
            if !ledger.add_income(income) {
                warn!("Skipping income {} in {}", income.name, income.month);
            }
        }
        ledger
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Adds a category unless its slug is empty or already taken.
    pub fn add_category(&mut self, name: &str) -> bool {
        let id = slugify_category_name(name);
        if id.is_empty() || self.categories.iter().any(|c| c.id == id) {
            return false;
        }
        self.categories.push(Category {
            id,
            name: name.trim().to_string(),
        });
        true
    }

    /// Records an expense. `category` may be an id or a display name.
    pub fn add_expense(
        &mut self,
        category: &str,
        amount: f64,
        currency: Option<&str>,
        month: &str,
    ) -> bool {
        let category_id = slugify_category_name(category);
        if !self.categories.iter().any(|c| c.id == category_id) {
            return false;
        }
        if !amount.is_finite() || amount <= 0.0 || !is_valid_month(month) {
            return false;
        }
        self.expenses.push(ExpenseEntry {
            category_id,
            amount,
            currency: normalize_currency(currency, DEFAULT_EXPENSE_CURRENCY),
            month: month.to_string(),
        });
        true
    }

    pub fn add_income(&mut self, income: &IncomeConfig) -> bool {
        if !income.amount.is_finite() || !is_valid_month(&income.month) {
            return false;
        }
        self.incomes.push(IncomeSource {
            name: income.name.clone(),
            category: income.category.clone().unwrap_or_default(),
            amount: income.amount,
            currency: normalize_currency(income.currency.as_deref(), DEFAULT_INCOME_CURRENCY),
            month: income.month.clone(),
        });
        true
    }

    pub fn expenses_for_month<'a>(&'a self, month: &'a str) -> impl Iterator<Item = &'a ExpenseEntry> {
        self.expenses.iter().filter(move |e| e.month == month)
    }

    pub fn incomes_for_month<'a>(&'a self, month: &'a str) -> impl Iterator<Item = &'a IncomeSource> {
        self.incomes.iter().filter(move |i| i.month == month)
    }

    pub fn expense_totals_by_currency(&self, month: &str) -> CurrencyTotals {
        let mut totals = CurrencyTotals::new();
        for entry in self.expenses_for_month(month) {
            *totals.entry(entry.currency.clone()).or_default() += entry.amount;
        }
        totals
    }

    /// Every category appears, even without entries for the month.
    pub fn expense_totals_by_category(&self, month: &str) -> BTreeMap<String, CurrencyTotals> {
        let mut totals: BTreeMap<String, CurrencyTotals> = self
            .categories
            .iter()
            .map(|c| (c.id.clone(), CurrencyTotals::new()))
            .collect();
        for entry in self.expenses_for_month(month) {
            *totals
                .entry(entry.category_id.clone())
                .or_default()
                .entry(entry.currency.clone())
                .or_default() += entry.amount;
        }
        totals
    }

    pub fn income_totals_by_currency(&self, month: &str) -> CurrencyTotals {
        let mut totals = CurrencyTotals::new();
        for income in self.incomes_for_month(month) {
            *totals.entry(income.currency.clone()).or_default() += income.amount;
        }
        totals
    }
}

/// Sums per-currency totals after converting each with `convert`.
pub fn converted_total(totals: &CurrencyTotals, convert: impl Fn(f64, &str) -> f64) -> f64 {
    totals
        .iter()
        .map(|(code, amount)| convert(*amount, code))
        .sum()
}
