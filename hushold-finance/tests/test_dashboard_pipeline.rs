use chrono::NaiveDate;
use hushold_core::{
    Forecast, ForecastPoint, MonthKey, PointSource, Taxonomy, Transaction, UNCATEGORIZED,
};
use hushold_finance::{
    ForecastProvider, NoForecast, aggregate_by_month, aggregate_income, aggregate_subcategory,
    available_years, build_aggregate_projection, build_history, build_projection,
    collect_forecasts, compute_average, load_transactions, resolve_category,
};
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("transactions.json")
}

fn transactions() -> Vec<Transaction> {
    load_transactions(fixture_path()).unwrap()
}

fn m(year: i32, month: u32) -> MonthKey {
    MonthKey::new(year, month).unwrap()
}

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Forecasts only Mat, and only for the first two future months.
struct MatOnly;

impl ForecastProvider for MatOnly {
    fn fetch(&self, category: &str, reference: MonthKey, _horizon: u32) -> Forecast {
        if category != "Mat" {
            return Forecast::Unavailable;
        }
        Forecast::Available(vec![
            ForecastPoint::new(reference.add_months(1), 700.0, 500.0, 900.0),
            ForecastPoint::new(reference.add_months(2), 710.0, 505.0, 915.0),
        ])
    }
}

#[test]
fn test_fixed_shape_for_default_taxonomy() {
    let taxonomy = Taxonomy::default();
    for txns in [transactions(), Vec::new()] {
        let table = aggregate_by_month(&txns, &taxonomy, 2024);
        assert_eq!(table.len(), taxonomy.expense_category_names().len());
        assert!(table.rows.iter().all(|r| r.months.len() == 12));
    }
}

#[test]
fn test_conservation_of_classified_spend() {
    let taxonomy = Taxonomy::default();
    let txns = transactions();
    let table = aggregate_by_month(&txns, &taxonomy, 2024);

    let expected: f64 = txns
        .iter()
        .filter(|t| t.month_key().is_some_and(|k| k.year() == 2024))
        .filter(|t| resolve_category(t, &taxonomy).is_some_and(|c| !taxonomy.is_income(c)))
        .map(|t| t.abs_amount())
        .sum();

    assert!(close(table.grand_total(), expected));
    // 812.40 + 9450 + 455.10 + 700 + 120 + 1890.55 + 333 + 85
    assert!(close(expected, 13846.05));
    assert!(close(table.value("Transport", m(2024, 2)), 700.0));
}

#[test]
fn test_mat_breakdown_from_feed() {
    let taxonomy = Taxonomy::default();
    let table = aggregate_subcategory(&transactions(), &taxonomy, "Mat", 2024).unwrap();

    assert_eq!(table.names().last(), Some(UNCATEGORIZED));
    assert!(close(table.value("Kiwi", m(2024, 1)), 812.40));
    assert!(close(table.value("Rema 1000", m(2024, 2)), 455.10));
    assert!(close(table.value(UNCATEGORIZED, m(2024, 2)), 120.0));
    assert!(close(table.value(UNCATEGORIZED, m(2024, 3)), 333.0));
    assert_eq!(table.row_total("Meny"), 0.0);

    let top = aggregate_by_month(&transactions(), &taxonomy, 2024);
    assert!(close(table.grand_total(), top.row_total("Mat")));
}

#[test]
fn test_income_and_years_from_feed() {
    let txns = transactions();
    let income = aggregate_income(&txns, "Inntekt", 2024);
    assert_eq!(income[&m(2024, 1)], 42000.0);
    assert_eq!(income[&m(2024, 2)], 42000.0);
    assert_eq!(income[&m(2024, 3)], 5000.0);
    assert_eq!(available_years(&txns), vec![2023, 2024]);
}

#[test]
fn test_category_projection_without_forecast() {
    let txns = transactions();
    let history = build_history(&txns, &Taxonomy::default());
    let mat = history.category("Mat").unwrap();

    let series = build_projection(mat, reference(), 12, &Forecast::Unavailable);
    assert!(series.is_contiguous());
    assert_eq!(series.points[0].month, m(2023, 12));
    assert_eq!(series.current().unwrap().month, m(2024, 4));

    let future: Vec<_> = series.future().collect();
    assert_eq!(future.len(), 12);
    assert_eq!(future[0].month, m(2024, 5));
    let average = compute_average(mat, reference());
    assert!(future.iter().all(|p| p.value == average && p.lower.is_none()));
}

#[test]
fn test_aggregate_projection_mixes_forecast_and_fallback() {
    let taxonomy = Taxonomy::default();
    let txns = transactions();
    let history = build_history(&txns, &taxonomy);
    let current = MonthKey::from_date(reference());
    let names = taxonomy.expense_category_names();

    let forecasts = collect_forecasts(&MatOnly, &names, current, 12);
    let series = build_aggregate_projection(&history.expenses, &forecasts, reference(), 12);

    assert!(series.is_contiguous());
    let may = series.get(m(2024, 5)).unwrap();
    assert_eq!((may.value, may.lower, may.upper), (700.0, Some(500.0), Some(900.0)));
    assert_eq!(may.source, PointSource::Forecast);

    let july = series.get(m(2024, 7)).unwrap();
    assert_eq!(july.source, PointSource::Average);
    assert_eq!(july.value, compute_average(&history.expenses, reference()));
    assert!(july.lower.is_none() && july.upper.is_none());

    // Forecasts arriving later do not disturb the fallback-only months.
    let without = build_aggregate_projection(
        &history.expenses,
        &collect_forecasts(&NoForecast, &names, current, 12),
        reference(),
        12,
    );
    assert_eq!(without.get(m(2024, 7)), series.get(m(2024, 7)));
    assert_eq!(without.len(), series.len());
}
