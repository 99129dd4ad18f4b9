//! Deterministic mapping of free-text category/subcategory labels onto the
//! caller's taxonomy.
//!
//! Priority: main-category name > subcategory label (declaration order) >
//! unclassified. All comparisons are trimmed and case-insensitive.

use hushold_core::{CategoryEntry, Taxonomy, Transaction, same_label};

/// Placement of a transaction inside one main category's breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubcategoryMatch<'a> {
    /// A declared subcategory label of the main category
    Known(&'a str),
    /// Missing subcategory, or one the main category does not declare
    Uncategorized,
}

/// Canonical main category of `tx`, or `None` when it cannot be classified.
pub fn resolve_category<'a>(tx: &Transaction, taxonomy: &'a Taxonomy) -> Option<&'a str> {
    resolve_entry(tx, taxonomy).map(|entry| entry.name.as_str())
}

/// Same as [`resolve_category`] but returns the whole taxonomy entry.
pub fn resolve_entry<'a>(tx: &Transaction, taxonomy: &'a Taxonomy) -> Option<&'a CategoryEntry> {
    // Main-category match wins regardless of subcategory.
    if let Some(entry) = taxonomy.find_category(&tx.category) {
        return Some(entry);
    }

    let sub = tx.subcategory()?;
    taxonomy
        .entries()
        .iter()
        .find(|entry| entry.find_subcategory(sub).is_some())
}

/// Where `tx` lands in the breakdown of `main`, or `None` if it does not
/// belong to `main` at all.
pub fn classify_subcategory<'a>(
    tx: &Transaction,
    taxonomy: &Taxonomy,
    main: &'a CategoryEntry,
) -> Option<SubcategoryMatch<'a>> {
    let resolved = resolve_entry(tx, taxonomy)?;
    if !same_label(&resolved.name, &main.name) {
        return None;
    }

    Some(
        tx.subcategory()
            .and_then(|sub| main.find_subcategory(sub))
            .map(SubcategoryMatch::Known)
            .unwrap_or(SubcategoryMatch::Uncategorized),
    )
}
