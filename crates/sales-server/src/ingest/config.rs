//! Ingestion configuration
//!
//! Read from `CSV_FILE_PATH`, `BATCH_SIZE` and `REFRESH_CRON`.

use sales_common::SalesError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::scheduler::parse_cron;

/// Default CSV location, relative to the working directory
pub const DEFAULT_CSV_FILE_PATH: &str = "data/sales.csv";

/// Default number of orders per committed batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestConfig {
    /// CSV file refreshed by `POST /api/v1/refresh` and the schedule
    pub csv_path: PathBuf,
    /// Orders accumulated before each commit
    pub batch_size: usize,
    /// Cron expression for scheduled refreshes (5 or 6 fields)
    pub refresh_cron: Option<String>,
}

impl IngestConfig {
    /// Load ingestion configuration from environment variables
    ///
    /// An unparseable `BATCH_SIZE` falls back to the default; zero is
    /// rejected by [`IngestConfig::validate`].
    pub fn from_env() -> sales_common::Result<Self> {
        let config = Self {
            csv_path: std::env::var("CSV_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CSV_FILE_PATH)),
            batch_size: std::env::var("BATCH_SIZE")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_BATCH_SIZE),
            refresh_cron: std::env::var("REFRESH_CRON")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> sales_common::Result<()> {
        if self.batch_size == 0 {
            return Err(SalesError::config("BATCH_SIZE", "must be greater than 0"));
        }
        if self.csv_path.as_os_str().is_empty() {
            return Err(SalesError::config("CSV_FILE_PATH", "cannot be empty"));
        }
        if let Some(ref expr) = self.refresh_cron {
            parse_cron(expr).map_err(|e| SalesError::config("REFRESH_CRON", e))?;
        }
        Ok(())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_FILE_PATH),
            batch_size: DEFAULT_BATCH_SIZE,
            refresh_cron: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("CSV_FILE_PATH");
        std::env::remove_var("BATCH_SIZE");
        std::env::remove_var("REFRESH_CRON");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = IngestConfig::from_env().unwrap();
        assert_eq!(config, IngestConfig::default());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("CSV_FILE_PATH", "/srv/data/orders.csv");
        std::env::set_var("BATCH_SIZE", "250");
        std::env::set_var("REFRESH_CRON", "0 2 * * *");

        let config = IngestConfig::from_env().unwrap();
        assert_eq!(config.csv_path, PathBuf::from("/srv/data/orders.csv"));
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.refresh_cron.as_deref(), Some("0 2 * * *"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_unparseable_batch_size_uses_default() {
        clear_env();
        std::env::set_var("BATCH_SIZE", "lots");
        assert_eq!(IngestConfig::from_env().unwrap().batch_size, DEFAULT_BATCH_SIZE);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_zero_batch_size_is_rejected() {
        clear_env();
        std::env::set_var("BATCH_SIZE", "0");
        let err = IngestConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("BATCH_SIZE"));
        clear_env();
    }

    #[test]
    fn test_invalid_cron_is_rejected() {
        let config = IngestConfig {
            refresh_cron: Some("every tuesday".to_string()),
            ..IngestConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
