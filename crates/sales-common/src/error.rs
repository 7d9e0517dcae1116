//! Error types shared across the sales analytics crates

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, SalesError>;

/// Errors shared across the workspace crates
#[derive(Error, Debug)]
pub enum SalesError {
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SalesError {
    /// Configuration error naming the offending setting
    pub fn config(setting: &str, reason: impl std::fmt::Display) -> Self {
        Self::Config(format!("{}: {}", setting, reason))
    }
}
