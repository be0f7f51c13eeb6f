//! Application settings loading from config.toml
//!
//! Every section is optional; a missing file yields the defaults. The
//! department table is not configurable and does not live here.

use crate::{
    core::aggregate::DEFAULT_TOP_N,
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Store settings
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Report presentation settings
    #[serde(default)]
    pub report: ReportSettings,
}

/// `[database]` section
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseSettings {
    /// Connection URL; `DATABASE_URL` overrides it
    pub url: Option<String>,
}

/// `[report]` section
#[derive(Debug, Deserialize)]
pub struct ReportSettings {
    /// Rows shown in department and supplier tables
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Zero-fill months without records in the time series
    #[serde(default)]
    pub fill_empty_months: bool,
}

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            fill_empty_months: false,
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - `report.top_n` is zero
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses settings from TOML text.
pub fn parse_config(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if settings.report.top_n == 0 {
        return Err(Error::Config {
            message: "report.top_n must be at least 1".to_string(),
        });
    }
    Ok(settings)
}

/// Loads settings from `./config.toml`, or the defaults when the file is absent.
pub fn load_default_config() -> Result<Settings> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_config(path)
    } else {
        info!("No config.toml found, using default settings");
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [database]
            url = "sqlite::memory:"

            [report]
            top_n = 5
            fill_empty_months = true
        "#;

        let settings = parse_config(toml_str).unwrap();
        assert_eq!(settings.database.url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(settings.report.top_n, 5);
        assert!(settings.report.fill_empty_months);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = parse_config("").unwrap();
        assert!(settings.database.url.is_none());
        assert_eq!(settings.report.top_n, DEFAULT_TOP_N);
        assert!(!settings.report.fill_empty_months);
    }

    #[test]
    fn test_partial_report_section() {
        let settings = parse_config("[report]\nfill_empty_months = true\n").unwrap();
        assert_eq!(settings.report.top_n, DEFAULT_TOP_N);
        assert!(settings.report.fill_empty_months);
    }

    #[test]
    fn test_zero_top_n_rejected() {
        assert!(matches!(
            parse_config("[report]\ntop_n = 0\n"),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(matches!(
            parse_config("[report\ntop_n = 3"),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        assert!(matches!(
            load_config("does/not/exist.toml"),
            Err(Error::Config { .. })
        ));
    }
}
