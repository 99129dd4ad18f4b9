//! Transaction records as delivered by the transaction feed.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::month::MonthKey;

/// Opaque transaction identifier. The feed sends integers, but any
/// string id is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransactionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionId::Number(n) => write!(f, "{n}"),
            TransactionId::Text(s) => f.write_str(s),
        }
    }
}

/// A single income or expense record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    /// Raw date text. Kept unparsed so one bad record cannot fail decoding
    /// of the whole feed; see [`Transaction::date`].
    pub transaction_date: String,
    /// Free-text main category
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Positive = income, negative = expense (sign is not enforced)
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
}

impl Transaction {
    /// Create a new Transaction
    pub fn new(
        id: impl Into<String>,
        transaction_date: impl Into<String>,
        category: impl Into<String>,
        subcategory: Option<&str>,
        amount: f64,
    ) -> Self {
        Self {
            id: TransactionId::Text(id.into()),
            transaction_date: transaction_date.into(),
            category: category.into(),
            subcategory: subcategory.map(str::to_string),
            description: None,
            amount,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Calendar date of the transaction, or `None` when the text does not
    /// parse. Accepts `YYYY-MM-DD` and ISO timestamps (date part only).
    pub fn date(&self) -> Option<NaiveDate> {
        let text = self.transaction_date.trim();
        let date_part = text.get(..10).unwrap_or(text);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    /// Month bucket of the transaction, `None` for malformed dates.
    pub fn month_key(&self) -> Option<MonthKey> {
        self.date().map(MonthKey::from_date)
    }

    /// Trimmed subcategory, `None` when absent or blank.
    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns true if this is an expense (negative amount)
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// Returns true if this is income (positive amount)
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    /// Get the absolute amount
    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }
}

/// Amounts arrive as JSON numbers from the API but as decimal strings from
/// some database dumps.
fn deserialize_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(n) => Ok(n),
        Amount::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {s}"))),
    }
}
