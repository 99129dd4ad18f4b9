//! Projection series and the shape of external statistical forecasts.

use serde::{Deserialize, Serialize};

use crate::month::MonthKey;

/// Where a projection point's value came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PointSource {
    /// Recorded amount for a completed month
    #[serde(rename = "actual")]
    Actual,
    /// Recorded amount so far for the in-progress month
    #[serde(rename = "partial")]
    Partial,
    /// External forecast point used verbatim
    #[serde(rename = "forecast")]
    Forecast,
    /// Flat historical average used as fallback
    #[serde(rename = "average")]
    Average,
}

/// One month of a projection series. `lower`/`upper` are only set when an
/// external forecast supplied them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionPoint {
    pub month: MonthKey,
    pub value: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub source: PointSource,
}

impl ProjectionPoint {
    pub fn plain(month: MonthKey, value: f64, source: PointSource) -> Self {
        Self {
            month,
            value,
            lower: None,
            upper: None,
            source,
        }
    }

    pub fn has_band(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }
}

/// Chronological, gap-free run of points: completed months, then the
/// in-progress month, then the future horizon.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectionSeries {
    pub points: Vec<ProjectionPoint>,
}

impl ProjectionSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, month: MonthKey) -> Option<&ProjectionPoint> {
        self.points.iter().find(|p| p.month == month)
    }

    pub fn historical(&self) -> impl Iterator<Item = &ProjectionPoint> {
        self.points
            .iter()
            .filter(|p| p.source == PointSource::Actual)
    }

    pub fn current(&self) -> Option<&ProjectionPoint> {
        self.points
            .iter()
            .find(|p| p.source == PointSource::Partial)
    }

    /// Points after the in-progress month.
    pub fn future(&self) -> impl Iterator<Item = &ProjectionPoint> {
        self.points
            .iter()
            .filter(|p| matches!(p.source, PointSource::Forecast | PointSource::Average))
    }

    /// True when every point is exactly one month after its predecessor.
    pub fn is_contiguous(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[0].month.succ() == w[1].month)
    }
}

/// A point as returned by the forecasting service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    pub date: MonthKey,
    pub value: f64,
    #[serde(default)]
    pub lower: Option<f64>,
    #[serde(default)]
    pub upper: Option<f64>,
}

impl ForecastPoint {
    pub fn new(date: MonthKey, value: f64, lower: f64, upper: f64) -> Self {
        Self {
            date,
            value,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Confidence band, collapsing to the point value when the service
    /// omitted a bound.
    pub fn band(&self) -> (f64, f64) {
        (
            self.lower.unwrap_or(self.value),
            self.upper.unwrap_or(self.value),
        )
    }
}

/// Response body of the forecasting service for one category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExternalForecast {
    #[serde(default)]
    pub projected: Vec<ForecastPoint>,
}

/// Forecast state for one category. A failed or missing fetch is just
/// `Unavailable`; it is never an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Forecast {
    Available(Vec<ForecastPoint>),
    #[default]
    Unavailable,
}

impl Forecast {
    pub fn is_available(&self) -> bool {
        matches!(self, Forecast::Available(_))
    }

    pub fn point(&self, month: MonthKey) -> Option<&ForecastPoint> {
        match self {
            Forecast::Available(points) => points.iter().find(|p| p.date == month),
            Forecast::Unavailable => None,
        }
    }
}

impl From<ExternalForecast> for Forecast {
    fn from(external: ExternalForecast) -> Self {
        Forecast::Available(external.projected)
    }
}

impl From<Option<ExternalForecast>> for Forecast {
    fn from(external: Option<ExternalForecast>) -> Self {
        external.map(Forecast::from).unwrap_or_default()
    }
}
