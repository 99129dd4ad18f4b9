use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$HUSHOLD_HOME`, or `~/.hushold`.
pub fn hushold_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("HUSHOLD_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".hushold"))
}

pub fn ensure_hushold_home() -> Result<PathBuf> {
    let dir = hushold_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
