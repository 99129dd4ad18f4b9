//! hushold-core: data model shared by the aggregation engine and the CLI

pub mod error;
pub mod month;
pub mod projection;
pub mod taxonomy;
pub mod transaction;

pub use error::{HusholdError, Result};
pub use month::{reference_date_in, MonthKey};
pub use projection::{
    ExternalForecast, Forecast, ForecastPoint, PointSource, ProjectionPoint, ProjectionSeries,
};
pub use taxonomy::{same_label, CategoryEntry, Taxonomy, DEFAULT_INCOME_CATEGORY, UNCATEGORIZED};
pub use transaction::{Transaction, TransactionId};
