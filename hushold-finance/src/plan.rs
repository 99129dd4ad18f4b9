//! Savings plan: historical averages, adjusted per category by a caller
//! percentage, rolled forward month by month into cumulative savings.

use chrono::NaiveDate;
use hushold_core::{HusholdError, MonthKey, Taxonomy, same_label};
use serde::Serialize;

use crate::aggregate::History;
use crate::average::{compute_average_over, months_since};

pub const DEFAULT_PLAN_MONTHS: u32 = 12;
pub const MAX_PLAN_MONTHS: u32 = 60;

/// Clamp a requested horizon to 1..=60 months.
pub fn clamp_months(months: u32) -> u32 {
    months.clamp(1, MAX_PLAN_MONTHS)
}

/// Percentage change applied to one category's average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adjustment {
    pub category: String,
    pub percent: f64,
}

impl Adjustment {
    /// Parse `Category=percent` (e.g. `Mat=-10`, `transport=+5%`). The
    /// category is normalized to its taxonomy spelling.
    pub fn parse(text: &str, taxonomy: &Taxonomy) -> Result<Self, HusholdError> {
        let invalid = || HusholdError::InvalidAdjustment(text.to_string());
        let (name, pct) = text.split_once('=').ok_or_else(invalid)?;

        let entry = taxonomy
            .expense_entries()
            .find(|e| same_label(&e.name, name))
            .ok_or_else(|| HusholdError::UnknownCategory(name.trim().to_string()))?;

        let pct = pct.trim();
        let pct = pct.strip_suffix('%').unwrap_or(pct);
        let pct = pct.strip_prefix('+').unwrap_or(pct);
        let percent: f64 = pct.trim().parse().map_err(|_| invalid())?;
        if !percent.is_finite() {
            return Err(invalid());
        }

        Ok(Self {
            category: entry.name.clone(),
            percent,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPlan {
    pub name: String,
    pub average: f64,
    pub adjustment_pct: f64,
    /// Monthly amount after adjustment
    pub projected: f64,
    /// `projected` over the whole plan
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanMonth {
    pub month: MonthKey,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    pub cumulative_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsPlan {
    pub avg_income: f64,
    pub avg_expenses: f64,
    pub projected_income: f64,
    pub projected_expenses: f64,
    pub monthly_savings: f64,
    pub categories: Vec<CategoryPlan>,
    pub months: Vec<PlanMonth>,
}

impl SavingsPlan {
    pub fn final_savings(&self) -> Option<f64> {
        self.months.last().map(|m| m.cumulative_savings)
    }
}

/// Build a plan over `months` (clamped to 1..=60) starting the month after
/// `reference`.
pub fn build_savings_plan(
    history: &History,
    reference: NaiveDate,
    months: u32,
    initial_savings: f64,
    adjustments: &[Adjustment],
) -> SavingsPlan {
    let months = clamp_months(months);
    // One window for income and every category, so the averages compare.
    let window = months_since(history.first_month(), reference);

    let categories: Vec<CategoryPlan> = history
        .categories
        .iter()
        .map(|row| {
            let average = compute_average_over(&row.months, &window);
            let adjustment_pct = adjustments
                .iter()
                .rev()
                .find(|a| same_label(&a.category, &row.name))
                .map(|a| a.percent)
                .unwrap_or(0.0);
            let projected = average * (1.0 + adjustment_pct / 100.0);
            CategoryPlan {
                name: row.name.clone(),
                average,
                adjustment_pct,
                projected,
                total: projected * months as f64,
            }
        })
        .collect();

    let avg_income = compute_average_over(&history.income, &window);
    let avg_expenses = compute_average_over(&history.expenses, &window);
    let projected_income = avg_income;
    let projected_expenses: f64 = categories.iter().map(|c| c.projected).sum();
    let monthly_savings = projected_income - projected_expenses;

    let start = MonthKey::from_date(reference);
    let mut cumulative = initial_savings;
    let schedule = (1..=months as i32)
        .map(|offset| {
            cumulative += monthly_savings;
            PlanMonth {
                month: start.add_months(offset),
                income: projected_income,
                expenses: projected_expenses,
                savings: monthly_savings,
                cumulative_savings: cumulative,
            }
        })
        .collect();

    SavingsPlan {
        avg_income,
        avg_expenses,
        projected_income,
        projected_expenses,
        monthly_savings,
        categories,
        months: schedule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_history;
    use hushold_core::{CategoryEntry, Transaction};

    fn taxonomy() -> Taxonomy {
        Taxonomy::new(
            "Inntekt",
            vec![
                CategoryEntry::new("Mat", &["Kiwi"]),
                CategoryEntry::new("Transport", &["Bensin"]),
            ],
        )
    }

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn history() -> History {
        let txns = vec![
            Transaction::new("1", "2024-01-05", "Mat", None, -4000.0),
            Transaction::new("2", "2024-02-05", "Mat", None, -6000.0),
            Transaction::new("3", "2024-02-07", "Transport", None, -1000.0),
            Transaction::new("4", "2024-01-25", "Inntekt", None, 30000.0),
            Transaction::new("5", "2024-02-25", "Inntekt", None, 30000.0),
            // In progress: excluded from every average.
            Transaction::new("6", "2024-03-02", "Mat", None, -50000.0),
        ];
        build_history(&txns, &taxonomy())
    }

    #[test]
    fn test_parse_adjustment() {
        let tax = taxonomy();
        assert_eq!(
            Adjustment::parse(" mat = -10", &tax).unwrap(),
            Adjustment {
                category: "Mat".to_string(),
                percent: -10.0
            }
        );
        assert_eq!(Adjustment::parse("Transport=+5%", &tax).unwrap().percent, 5.0);
        assert_eq!(
            Adjustment::parse("Reise=5", &tax),
            Err(HusholdError::UnknownCategory("Reise".to_string()))
        );
        assert!(matches!(
            Adjustment::parse("Mat", &tax),
            Err(HusholdError::InvalidAdjustment(_))
        ));
        assert!(matches!(
            Adjustment::parse("Mat=lots", &tax),
            Err(HusholdError::InvalidAdjustment(_))
        ));
    }

    #[test]
    fn test_plan_without_adjustments() {
        let plan = build_savings_plan(&history(), reference(), 12, 1000.0, &[]);

        assert_eq!(plan.avg_income, 30000.0);
        assert_eq!(plan.categories[0].average, 5000.0);
        assert_eq!(plan.categories[1].average, 500.0);
        assert_eq!(plan.projected_expenses, 5500.0);
        assert_eq!(plan.avg_expenses, 5500.0);
        assert_eq!(plan.monthly_savings, 24500.0);

        assert_eq!(plan.months.len(), 12);
        assert_eq!(plan.months[0].month, MonthKey::new(2024, 4).unwrap());
        assert_eq!(plan.months[0].cumulative_savings, 25500.0);
        assert_eq!(plan.final_savings(), Some(1000.0 + 12.0 * 24500.0));
        assert_eq!(plan.categories[0].total, 60000.0);
    }

    #[test]
    fn test_plan_applies_adjustments() {
        let adjustments = vec![Adjustment::parse("Mat=-10", &taxonomy()).unwrap()];
        let plan = build_savings_plan(&history(), reference(), 1, 0.0, &adjustments);
        assert_eq!(plan.categories[0].projected, 4500.0);
        assert_eq!(plan.categories[1].projected, 500.0);
        assert_eq!(plan.monthly_savings, 25000.0);
    }

    #[test]
    fn test_income_and_expenses_share_one_window() {
        let txns = vec![
            Transaction::new("1", "2023-12-05", "Mat", None, -1200.0),
            Transaction::new("2", "2024-02-25", "Inntekt", None, 900.0),
        ];
        let history = build_history(&txns, &taxonomy());
        let reference = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
        let plan = build_savings_plan(&history, reference, 1, 0.0, &[]);

        // Jan 2023 through Mar 2024 for both sides.
        assert_eq!(plan.categories[0].average, 80.0);
        assert_eq!(plan.avg_income, 60.0);
        assert_eq!(plan.avg_expenses, 80.0);
        assert_eq!(plan.monthly_savings, -20.0);
    }

    #[test]
    fn test_plan_months_are_clamped() {
        assert_eq!(build_savings_plan(&history(), reference(), 0, 0.0, &[]).months.len(), 1);
        assert_eq!(build_savings_plan(&history(), reference(), 600, 0.0, &[]).months.len(), 60);
    }
}
