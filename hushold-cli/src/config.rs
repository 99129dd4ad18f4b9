use anyhow::{Context, Result};
use hushold_core::Taxonomy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_hushold_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub taxonomy: Taxonomy,
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub forecast: ForecastSection,
    #[serde(default)]
    pub projection: ProjectionSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedSection {
    /// JSON dump of `GET /transactions`
    pub path: Option<PathBuf>,
    /// Base URL of the REST API, e.g. `http://localhost:5000/api`
    pub api_url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastSection {
    pub enabled: bool,
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionSection {
    pub horizon_months: u32,
    /// IANA timezone used to turn "now" into today's date
    pub timezone: String,
}

impl Default for ForecastSection {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:5000/api".to_string(),
            token: None,
            timeout_secs: 10,
        }
    }
}

impl Default for ProjectionSection {
    fn default() -> Self {
        Self {
            horizon_months: 12,
            timezone: "UTC".to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_hushold_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.taxonomy.income_category, "Inntekt");
        assert_eq!(cfg.projection.horizon_months, 12);
        assert!(!cfg.forecast.enabled);
    }

    #[test]
    fn test_round_trip_keeps_category_order() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        save_config_to(&Config::default(), &p).unwrap();
        let back = load_config_from(&p).unwrap();
        assert_eq!(
            back.taxonomy.expense_category_names(),
            Config::default().taxonomy.expense_category_names()
        );
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(
            &p,
            r#"
[taxonomy]
income_category = "Income"

[[taxonomy.categories]]
name = "Food"
subcategories = ["Groceries", "Takeaway"]

[[taxonomy.categories]]
name = "Rent"

[feed]
path = "/tmp/transactions.json"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.taxonomy.income_category, "Income");
        assert_eq!(cfg.taxonomy.expense_category_names(), vec!["Food", "Rent"]);
        assert_eq!(cfg.feed.path, Some(PathBuf::from("/tmp/transactions.json")));
        assert_eq!(cfg.forecast, ForecastSection::default());
    }

    #[test]
    fn test_invalid_toml_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "taxonomy = [").unwrap();
        let err = load_config_from(&p).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
