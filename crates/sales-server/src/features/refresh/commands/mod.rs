pub mod start;

pub use start::{StartRefreshCommand, StartRefreshError, StartRefreshResponse};
