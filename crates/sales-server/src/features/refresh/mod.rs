pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{StartRefreshCommand, StartRefreshError, StartRefreshResponse};
pub use queries::GetRefreshStatusQuery;
pub use routes::{refresh_routes, RefreshState};
