//! Error type for caller contract violations.
//!
//! Bad data never produces one of these: malformed dates, unknown
//! subcategories and missing forecasts all degrade to zero or fallback
//! values. These variants are reserved for arguments a caller should
//! never have passed.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HusholdError {
    /// The requested main category is not declared in the taxonomy.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("invalid month key '{0}' (expected YYYY-MM)")]
    InvalidMonthKey(String),

    #[error("month out of range: {0}")]
    InvalidMonth(u32),

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Adjustment text that is not `Category=percent`.
    #[error("invalid adjustment '{0}' (expected Category=percent)")]
    InvalidAdjustment(String),
}

pub type Result<T> = std::result::Result<T, HusholdError>;
