pub mod queries;
pub mod routes;

pub use queries::{
    CategoryRevenue, ProductRevenue, RegionRevenue, RevenueByCategoryQuery,
    RevenueByProductQuery, RevenueByRegionQuery, RevenueError, TotalRevenue, TotalRevenueQuery,
};

pub use routes::revenue_routes;
