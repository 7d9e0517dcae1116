//! Shared validation utilities
//!
//! Date range parsing for the reporting endpoints.
//!
//! # Examples
//!
//! ```rust,ignore
//! use sales_server::features::shared::validation::DateRange;
//!
//! let range = DateRange::parse(Some("2024-01-01"), Some("2024-03-31"))?;
//! assert!(range.start <= range.end);
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::ingest::parser::parse_sale_date;

/// Errors that can occur while validating a report date range
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("Both start_date and end_date are required in format YYYY-MM-DD")]
    Missing,

    #[error("Invalid start date '{0}'. Date must be in format YYYY-MM-DD")]
    InvalidStart(String),

    #[error("Invalid end date '{0}'. Date must be in format YYYY-MM-DD")]
    InvalidEnd(String),

    #[error("End date cannot be before start date")]
    EndBeforeStart,
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parse and validate `start_date`/`end_date` query values
    ///
    /// Empty strings count as missing.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, DateRangeError> {
        let (start_raw, end_raw) = match (non_empty(start), non_empty(end)) {
            (Some(s), Some(e)) => (s, e),
            _ => return Err(DateRangeError::Missing),
        };

        let start = parse_date(start_raw)
            .ok_or_else(|| DateRangeError::InvalidStart(start_raw.to_string()))?;
        let end =
            parse_date(end_raw).ok_or_else(|| DateRangeError::InvalidEnd(end_raw.to_string()))?;

        if end < start {
            return Err(DateRangeError::EndBeforeStart);
        }

        Ok(Self { start, end })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Same strict `YYYY-MM-DD` rule as the CSV sale date
fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_sale_date(value).ok()
}
