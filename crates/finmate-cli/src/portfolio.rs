//! JSON portfolio file

use anyhow::{Context, bail};
use finmate_tools::tool::normalize_ticker;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PortfolioData {
    #[serde(default)]
    tickers: Vec<String>,
}

/// Ticker list stored as `{"tickers": [...]}`
#[derive(Debug, Clone)]
pub struct PortfolioFile {
    path: PathBuf,
}

impl PortfolioFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored tickers; a missing or unreadable file reads as empty
    pub fn load(&self) -> Vec<String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %e, "Could not read portfolio file");
                }
                return Vec::new();
            }
        };

        match serde_json::from_str::<PortfolioData>(&raw) {
            Ok(data) => data.tickers,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Portfolio file is corrupt, treating it as empty"
                );
                Vec::new()
            }
        }
    }

    fn save(&self, tickers: Vec<String>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&PortfolioData { tickers })?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("could not write {}", self.path.display()))
    }

    /// Add a ticker (upper-cased); returns false when it was already present
    pub fn add(&self, ticker: &str) -> anyhow::Result<bool> {
        let Some(ticker) = normalize_ticker(ticker) else {
            bail!("ticker must not be empty");
        };

        let mut tickers = self.load();
        if tickers.contains(&ticker) {
            return Ok(false);
        }
        tickers.push(ticker);
        self.save(tickers)?;
        Ok(true)
    }

    /// Remove a ticker; returns false when it was not present
    pub fn remove(&self, ticker: &str) -> anyhow::Result<bool> {
        let Some(ticker) = normalize_ticker(ticker) else {
            return Ok(false);
        };

        let mut tickers = self.load();
        let before = tickers.len();
        tickers.retain(|t| *t != ticker);
        if tickers.len() == before {
            return Ok(false);
        }
        self.save(tickers)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch() -> (TempDir, PortfolioFile) {
        let dir = TempDir::new().unwrap();
        let file = PortfolioFile::new(dir.path().join("portfolio.json"));
        (dir, file)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, file) = scratch();
        assert!(file.load().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let (_dir, file) = scratch();
        std::fs::write(file.path(), "{not json").unwrap();
        assert!(file.load().is_empty());

        // and can be overwritten by the next add
        assert!(file.add("aapl").unwrap());
        assert_eq!(file.load(), vec!["AAPL"]);
    }

    #[test]
    fn test_add_is_idempotent_and_upper_cases() {
        let (_dir, file) = scratch();
        assert!(file.add(" tsla ").unwrap());
        assert!(!file.add("TSLA").unwrap());
        assert!(file.add("msft").unwrap());
        assert_eq!(file.load(), vec!["TSLA", "MSFT"]);
        assert!(file.add("   ").is_err());
    }

    #[test]
    fn test_remove() {
        let (_dir, file) = scratch();
        file.add("AAPL").unwrap();
        file.add("NVDA").unwrap();

        assert!(file.remove("aapl").unwrap());
        assert!(!file.remove("AAPL").unwrap());
        assert!(!file.remove("GOOG").unwrap());
        assert_eq!(file.load(), vec!["NVDA"]);
    }

    #[test]
    fn test_remove_on_missing_file_is_noop() {
        let (_dir, file) = scratch();
        assert!(!file.remove("AAPL").unwrap());
        assert!(!file.path().exists());
    }
}
