//! Monthly aggregation: (category × month) sums for one calendar year, the
//! subcategory breakdown of a single main category, income per month, and
//! the multi-year history the averager and projections work from.
//!
//! Every table comes back fixed-shape: each row in scope has all twelve
//! months present, zero when nothing was spent. Sums are unrounded.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use hushold_core::{HusholdError, MonthKey, Taxonomy, Transaction, UNCATEGORIZED, same_label};
use serde::Serialize;
use tracing::debug;

use crate::resolver::{SubcategoryMatch, classify_subcategory, resolve_category};

/// Amount per month, chronologically ordered.
pub type MonthlySeries = BTreeMap<MonthKey, f64>;

/// Zero-filled series covering January..December of `year`.
pub fn empty_year(year: i32) -> MonthlySeries {
    MonthKey::months_of_year(year).map(|m| (m, 0.0)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub months: MonthlySeries,
}

impl CategoryRow {
    pub fn total(&self) -> f64 {
        self.months.values().sum()
    }
}

/// Rows in a caller-defined order (taxonomy declaration order), each with
/// a full year of months.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTable {
    pub year: i32,
    pub rows: Vec<CategoryRow>,
}

impl CategoryTable {
    fn with_rows<I, S>(year: i32, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            year,
            rows: names
                .into_iter()
                .map(|name| CategoryRow {
                    name: name.into(),
                    months: empty_year(year),
                })
                .collect(),
        }
    }

    fn add(&mut self, name: &str, month: MonthKey, amount: f64) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.name == name) {
            *row.months.entry(month).or_insert(0.0) += amount;
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&MonthlySeries> {
        self.rows
            .iter()
            .find(|r| same_label(&r.name, name))
            .map(|r| &r.months)
    }

    pub fn value(&self, name: &str, month: MonthKey) -> f64 {
        self.get(name)
            .and_then(|s| s.get(&month))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn row_total(&self, name: &str) -> f64 {
        self.get(name).map(|s| s.values().sum()).unwrap_or(0.0)
    }

    pub fn month_total(&self, month: MonthKey) -> f64 {
        self.rows
            .iter()
            .filter_map(|r| r.months.get(&month))
            .sum()
    }

    pub fn grand_total(&self) -> f64 {
        self.rows.iter().map(CategoryRow::total).sum()
    }
}

/// Expense totals per canonical category for `year`.
///
/// Rows are the taxonomy's expense categories (the income bucket is
/// excluded). Unclassifiable transactions and malformed dates are skipped.
pub fn aggregate_by_month(
    transactions: &[Transaction],
    taxonomy: &Taxonomy,
    year: i32,
) -> CategoryTable {
    let mut table = CategoryTable::with_rows(year, taxonomy.expense_category_names());
    let mut bad_dates = 0usize;
    let mut unclassified = 0usize;

    for tx in transactions {
        let Some(month) = tx.month_key() else {
            bad_dates += 1;
            continue;
        };
        if month.year() != year {
            continue;
        }
        match resolve_category(tx, taxonomy) {
            Some(category) if !taxonomy.is_income(category) => {
                table.add(category, month, tx.abs_amount());
            }
            Some(_) => {}
            None => unclassified += 1,
        }
    }

    debug!(year, bad_dates, unclassified, "aggregated expenses by month");
    table
}

/// Breakdown of one main category into its declared subcategories plus a
/// trailing `Uncategorized` row.
///
/// Fails only when `main_category` is not in the taxonomy.
pub fn aggregate_subcategory(
    transactions: &[Transaction],
    taxonomy: &Taxonomy,
    main_category: &str,
    year: i32,
) -> Result<CategoryTable, HusholdError> {
    let main = taxonomy
        .find_category(main_category)
        .ok_or_else(|| HusholdError::UnknownCategory(main_category.to_string()))?;

    let names = main
        .subcategories
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(UNCATEGORIZED));
    let mut table = CategoryTable::with_rows(year, names);

    for tx in transactions {
        let Some(month) = tx.month_key().filter(|m| m.year() == year) else {
            continue;
        };
        match classify_subcategory(tx, taxonomy, main) {
            Some(SubcategoryMatch::Known(sub)) => table.add(sub, month, tx.abs_amount()),
            Some(SubcategoryMatch::Uncategorized) => {
                table.add(UNCATEGORIZED, month, tx.abs_amount())
            }
            None => {}
        }
    }

    Ok(table)
}

/// Signed income per month of `year`. Matches `income_category` against
/// the transaction's main category only, independent of the expense
/// taxonomy.
pub fn aggregate_income(
    transactions: &[Transaction],
    income_category: &str,
    year: i32,
) -> MonthlySeries {
    income_for_year(transactions, income_category, year, |_| true)
}

/// Like [`aggregate_income`], restricted to a single income subcategory.
/// The subcategory must match exactly (case-sensitive), as listed by
/// [`income_subcategories`].
pub fn aggregate_income_by_subcategory(
    transactions: &[Transaction],
    income_category: &str,
    year: i32,
    subcategory: &str,
) -> MonthlySeries {
    income_for_year(transactions, income_category, year, |tx| {
        tx.subcategory() == Some(subcategory)
    })
}

fn income_for_year<F>(
    transactions: &[Transaction],
    income_category: &str,
    year: i32,
    keep: F,
) -> MonthlySeries
where
    F: Fn(&Transaction) -> bool,
{
    let mut series = empty_year(year);
    for tx in transactions {
        if !same_label(&tx.category, income_category) || !keep(tx) {
            continue;
        }
        if let Some(month) = tx.month_key().filter(|m| m.year() == year) {
            *series.entry(month).or_insert(0.0) += tx.amount;
        }
    }
    series
}

/// Distinct income subcategories, sorted.
pub fn income_subcategories(transactions: &[Transaction], income_category: &str) -> Vec<String> {
    transactions
        .iter()
        .filter(|tx| same_label(&tx.category, income_category))
        .filter_map(|tx| tx.subcategory().map(str::to_string))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct calendar years among transactions with a valid date, ascending.
pub fn available_years(transactions: &[Transaction]) -> Vec<i32> {
    transactions
        .iter()
        .filter_map(|tx| tx.date())
        .map(|d| d.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Year to show first: the current year if it has data, otherwise the
/// earliest year that does, otherwise the current year.
pub fn default_year(available: &[i32], current_year: i32) -> i32 {
    if available.contains(&current_year) {
        return current_year;
    }
    available.first().copied().unwrap_or(current_year)
}

/// Sparse month series across every year in the feed, per expense
/// category, plus total expenses and signed income.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct History {
    pub categories: Vec<CategoryRow>,
    /// Sum over the classified expense categories
    pub expenses: MonthlySeries,
    pub income: MonthlySeries,
}

impl History {
    pub fn category(&self, name: &str) -> Option<&MonthlySeries> {
        self.categories
            .iter()
            .find(|r| same_label(&r.name, name))
            .map(|r| &r.months)
    }

    /// Earliest month with any income or expense.
    pub fn first_month(&self) -> Option<MonthKey> {
        let income = self.income.keys().next();
        let expenses = self.expenses.keys().next();
        income.into_iter().chain(expenses).min().copied()
    }
}

pub fn build_history(transactions: &[Transaction], taxonomy: &Taxonomy) -> History {
    let mut history = History {
        categories: taxonomy
            .expense_category_names()
            .into_iter()
            .map(|name| CategoryRow {
                name: name.to_string(),
                months: MonthlySeries::new(),
            })
            .collect(),
        ..History::default()
    };

    for tx in transactions {
        let Some(month) = tx.month_key() else {
            continue;
        };
        if taxonomy.is_income(&tx.category) {
            *history.income.entry(month).or_insert(0.0) += tx.amount;
            continue;
        }
        let Some(category) = resolve_category(tx, taxonomy) else {
            continue;
        };
        if taxonomy.is_income(category) {
            continue;
        }
        if let Some(row) = history.categories.iter_mut().find(|r| r.name == category) {
            *row.months.entry(month).or_insert(0.0) += tx.abs_amount();
            *history.expenses.entry(month).or_insert(0.0) += tx.abs_amount();
        }
    }

    history
}
