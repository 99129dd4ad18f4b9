//! Projection composer: recorded history, the in-progress month, and a
//! forward horizon where each future month takes the external forecast if
//! one exists and the flat historical average otherwise.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use hushold_core::{Forecast, MonthKey, PointSource, ProjectionPoint, ProjectionSeries};

use crate::aggregate::MonthlySeries;
use crate::average::compute_average;

/// Forecast value and band for one month.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Estimate {
    value: f64,
    lower: f64,
    upper: f64,
}

/// Projection for a single series (one category, or income).
///
/// `forecast` may be `Unavailable`, or cover any subset of the horizon;
/// months it does not cover fall back to [`compute_average`].
pub fn build_projection(
    historical: &MonthlySeries,
    reference: NaiveDate,
    horizon_months: u32,
    forecast: &Forecast,
) -> ProjectionSeries {
    compose(historical, reference, horizon_months, |month| {
        forecast.point(month).map(|p| {
            let (lower, upper) = p.band();
            Estimate {
                value: p.value,
                lower,
                upper,
            }
        })
    })
}

/// Projection of total expenses across categories.
///
/// A month's forecast is the sum of whichever per-category forecasts cover
/// it; with none, it falls back to the average of `total_historical`.
pub fn build_aggregate_projection(
    total_historical: &MonthlySeries,
    forecasts: &BTreeMap<String, Forecast>,
    reference: NaiveDate,
    horizon_months: u32,
) -> ProjectionSeries {
    compose(total_historical, reference, horizon_months, |month| {
        forecasts
            .values()
            .filter_map(|f| f.point(month))
            .fold(None, |acc: Option<Estimate>, p| {
                let (lower, upper) = p.band();
                let prev = acc.unwrap_or(Estimate {
                    value: 0.0,
                    lower: 0.0,
                    upper: 0.0,
                });
                Some(Estimate {
                    value: prev.value + p.value,
                    lower: prev.lower + lower,
                    upper: prev.upper + upper,
                })
            })
    })
}

fn compose<F>(
    historical: &MonthlySeries,
    reference: NaiveDate,
    horizon_months: u32,
    estimate: F,
) -> ProjectionSeries
where
    F: Fn(MonthKey) -> Option<Estimate>,
{
    let current = MonthKey::from_date(reference);
    let recorded = |month: MonthKey| historical.get(&month).copied().unwrap_or(0.0);
    let mut points = Vec::new();

    // Completed months, gap-free from the first recorded month.
    if let Some(first) = historical.keys().next().copied().filter(|m| *m < current) {
        for month in MonthKey::range_inclusive(first, current.pred()) {
            points.push(ProjectionPoint::plain(month, recorded(month), PointSource::Actual));
        }
    }

    // In-progress month: partial actual, with the forecast band overlaid.
    let mut partial = ProjectionPoint::plain(current, recorded(current), PointSource::Partial);
    if let Some(e) = estimate(current) {
        partial.lower = Some(e.lower);
        partial.upper = Some(e.upper);
    }
    points.push(partial);

    let average = compute_average(historical, reference);
    for offset in 1..=horizon_months as i32 {
        let month = current.add_months(offset);
        let point = match estimate(month) {
            Some(e) => ProjectionPoint {
                month,
                value: e.value,
                lower: Some(e.lower),
                upper: Some(e.upper),
                source: PointSource::Forecast,
            },
            None => ProjectionPoint::plain(month, average, PointSource::Average),
        };
        points.push(point);
    }

    ProjectionSeries { points }
}
