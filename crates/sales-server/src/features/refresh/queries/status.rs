use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::ingest::{IngestionCoordinator, IngestionStatus};

/// Current or most recent refresh run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetRefreshStatusQuery;

impl Request<IngestionStatus> for GetRefreshStatusQuery {}

pub fn handle(
    coordinator: &IngestionCoordinator,
    _query: GetRefreshStatusQuery,
) -> IngestionStatus {
    coordinator.status()
}
