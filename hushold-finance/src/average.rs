//! Historical monthly averages over completed calendar months.
//!
//! The in-progress month never counts: a partial month would drag the
//! average down. Months without data count as zero.

use chrono::NaiveDate;
use hushold_core::MonthKey;

use crate::aggregate::MonthlySeries;

/// Every calendar month from January of the first year in `series` up to,
/// but not including, the month of `reference`.
///
/// Gap years and months without data stay in the window and count as zero.
/// A series whose data all lies after `reference` has no eligible months.
pub fn eligible_months(series: &MonthlySeries, reference: NaiveDate) -> Vec<MonthKey> {
    months_since(series.keys().next().copied(), reference)
}

/// Calendar months from January of `first`'s year through the month before
/// `reference`; empty when `first` is `None` or not before `reference`.
pub fn months_since(first: Option<MonthKey>, reference: NaiveDate) -> Vec<MonthKey> {
    let current = MonthKey::from_date(reference);
    match first.and_then(|m| MonthKey::new(m.year(), 1).ok()) {
        Some(start) if start < current => MonthKey::range_inclusive(start, current.pred()),
        _ => Vec::new(),
    }
}

/// Mean monthly amount over [`eligible_months`]; `0.0` when none are
/// eligible.
pub fn compute_average(series: &MonthlySeries, reference: NaiveDate) -> f64 {
    compute_average_over(series, &eligible_months(series, reference))
}

/// Mean of `series` over an explicit month list, for callers that filter
/// the eligible months themselves.
pub fn compute_average_over(series: &MonthlySeries, months: &[MonthKey]) -> f64 {
    if months.is_empty() {
        return 0.0;
    }
    let total: f64 = months
        .iter()
        .map(|m| series.get(m).copied().unwrap_or(0.0))
        .sum();
    total / months.len() as f64
}
