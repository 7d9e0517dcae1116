pub mod status;

pub use status::GetRefreshStatusQuery;
