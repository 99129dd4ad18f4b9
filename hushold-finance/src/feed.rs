//! Transaction feed: the JSON array served by `GET /transactions`, read
//! from a saved dump or fetched live.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use hushold_core::Transaction;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, info};

/// Decode a feed payload. Dates are not validated here; records with bad
/// dates are skipped later by the aggregations.
pub fn parse_transactions_json(json: &str) -> Result<Vec<Transaction>> {
    let txns: Vec<Transaction> = serde_json::from_str(json).context("decode transaction feed")?;
    let undated = txns.iter().filter(|t| t.date().is_none()).count();
    if undated > 0 {
        debug!(undated, "feed contains transactions with malformed dates");
    }
    Ok(txns)
}

pub fn load_transactions(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let txns = parse_transactions_json(&s).with_context(|| format!("parsing {}", path.display()))?;
    info!(count = txns.len(), path = %path.display(), "loaded transactions");
    Ok(txns)
}

/// Fetch the full transaction list from the REST API.
pub async fn fetch_transactions(api_url: &str, token: Option<&str>) -> Result<Vec<Transaction>> {
    let url = format!("{}/transactions", api_url.trim_end_matches('/'));
    let client = reqwest::Client::new();
    let mut req = client.get(&url);
    if let Some(token) = token {
        req = req.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let resp = req.send().await.with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("transaction feed error: {status} {txt}");
    }

    let body = resp.text().await.context("read transaction feed")?;
    let txns = parse_transactions_json(&body)?;
    info!(count = txns.len(), url = %url, "fetched transactions");
    Ok(txns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FEED: &str = r#"[
        {"id": 1, "transaction_date": "2024-01-05", "category": "Mat",
         "subcategory": "Kiwi", "description": null, "amount": -100.0},
        {"id": 2, "transaction_date": "2024-13-40", "category": "Mat",
         "subcategory": null, "description": "typo", "amount": -5},
        {"id": "x-3", "transaction_date": "2024-01-25", "category": "Inntekt", "amount": "35000.00"}
    ]"#;

    #[test]
    fn test_parse_keeps_records_with_bad_dates() {
        let txns = parse_transactions_json(FEED).unwrap();
        assert_eq!(txns.len(), 3);
        assert!(txns[1].date().is_none());
        assert_eq!(txns[2].amount, 35000.0);
        assert_eq!(txns[2].subcategory, None);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_transactions_json(r#"{"error": "nope"}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FEED.as_bytes()).unwrap();
        let txns = load_transactions(file.path()).unwrap();
        assert_eq!(txns.len(), 3);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = load_transactions("/definitely/not/here.json").unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.json"));
    }
}
