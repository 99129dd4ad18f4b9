//! Category taxonomy: canonical main categories and their known
//! subcategory labels.
//!
//! A taxonomy is an immutable value handed to every aggregation call.
//! Declaration order matters: it is the tie-break order when a subcategory
//! label appears under more than one main category.

use serde::{Deserialize, Serialize};

pub const DEFAULT_INCOME_CATEGORY: &str = "Inntekt";

/// Synthetic subcategory row for transactions whose subcategory is missing
/// or unknown to their main category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Case-insensitive, whitespace-trimmed label comparison used everywhere
/// categories and subcategories are matched.
pub fn same_label(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    a == b || a.to_lowercase() == b.to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

impl CategoryEntry {
    pub fn new(name: impl Into<String>, subcategories: &[&str]) -> Self {
        Self {
            name: name.into(),
            subcategories: subcategories.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The declared subcategory label matching `label`, if any.
    pub fn find_subcategory(&self, label: &str) -> Option<&str> {
        self.subcategories
            .iter()
            .find(|s| same_label(s, label))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Taxonomy {
    /// Name of the income bucket. Matched case-insensitively and never
    /// treated as an expense category.
    #[serde(default = "default_income_category")]
    pub income_category: String,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
}

fn default_income_category() -> String {
    DEFAULT_INCOME_CATEGORY.to_string()
}

impl Taxonomy {
    pub fn new(income_category: impl Into<String>, categories: Vec<CategoryEntry>) -> Self {
        Self {
            income_category: income_category.into(),
            categories,
        }
    }

    /// All declared entries, in declaration order.
    pub fn entries(&self) -> &[CategoryEntry] {
        &self.categories
    }

    /// Declared entries except the income bucket, in declaration order.
    pub fn expense_entries(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.categories.iter().filter(|c| !self.is_income(&c.name))
    }

    pub fn expense_category_names(&self) -> Vec<&str> {
        self.expense_entries().map(|c| c.name.as_str()).collect()
    }

    /// Entry whose name matches `name` (trimmed, case-insensitive).
    pub fn find_category(&self, name: &str) -> Option<&CategoryEntry> {
        self.categories.iter().find(|c| same_label(&c.name, name))
    }

    pub fn is_income(&self, category: &str) -> bool {
        same_label(category, &self.income_category)
    }
}

impl Default for Taxonomy {
    /// The household taxonomy the dashboard shipped with before it became
    /// configurable.
    fn default() -> Self {
        Self::new(
            DEFAULT_INCOME_CATEGORY,
            vec![
                CategoryEntry::new(
                    "Hus",
                    &[
                        "Lån Storebrand",
                        "Eindomskatt  (moss kommune)",
                        "Renovasjon (moss kommune)",
                        "Gjensidige forsikring hus",
                    ],
                ),
                CategoryEntry::new(
                    "Faste utgifter",
                    &["Telia telefon", "Telia internett/Tv", "Strøm"],
                ),
                CategoryEntry::new("Personelig", &["Spenst", "Klær", "Sparing"]),
                CategoryEntry::new(
                    "Mat",
                    &[
                        "Rema 1000",
                        "Kiwi",
                        "Spar",
                        "Meny",
                        "Obs",
                        "Bunnpris",
                        "Willis",
                        "Nordby",
                        "Div butikk",
                    ],
                ),
                CategoryEntry::new(
                    "Transport",
                    &[
                        "Bensin",
                        "Toyota lån",
                        "Parkering",
                        "Gejensidige forsikring",
                        "Service",
                        "Bompenger",
                    ],
                ),
                CategoryEntry::new("Andre", &["Gaver", "Hage", "Andre"]),
            ],
        )
    }
}
