//! Shared utilities and types for feature modules

pub mod validation;

pub use validation::{DateRange, DateRangeError};
