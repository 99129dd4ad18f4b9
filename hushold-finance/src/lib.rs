//! hushold-finance: taxonomy resolver, monthly aggregator, historical
//! averager, projection composer, forecast providers and savings plan

pub mod aggregate;
pub mod average;
pub mod feed;
pub mod forecast;
pub mod plan;
pub mod projection;
pub mod resolver;

pub use aggregate::{
    CategoryRow, CategoryTable, History, MonthlySeries, aggregate_by_month, aggregate_income,
    aggregate_income_by_subcategory, aggregate_subcategory, available_years, build_history,
    default_year, income_subcategories,
};
pub use average::{compute_average, compute_average_over, eligible_months, months_since};
pub use feed::{fetch_transactions, load_transactions, parse_transactions_json};
pub use forecast::{
    ForecastProvider, ForecastSet, HttpForecastProvider, NoForecast, collect_forecasts,
};
pub use plan::{Adjustment, SavingsPlan, build_savings_plan, clamp_months};
pub use projection::{build_aggregate_projection, build_projection};
pub use resolver::{SubcategoryMatch, classify_subcategory, resolve_category};
