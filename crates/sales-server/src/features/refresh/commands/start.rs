use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::ingest::{IngestionCoordinator, StartError};

/// Start a refresh of the sales tables from a CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRefreshCommand {
    pub source: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRefreshResponse {
    pub run_id: Uuid,
    pub status: String,
    pub message: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum StartRefreshError {
    #[error("{0}")]
    AlreadyRunning(#[from] StartError),
}

impl Request<Result<StartRefreshResponse, StartRefreshError>> for StartRefreshCommand {}

/// Register a background run; never waits for it
#[tracing::instrument(skip(coordinator), fields(source = %command.source.display()))]
pub fn handle(
    coordinator: &IngestionCoordinator,
    command: StartRefreshCommand,
) -> Result<StartRefreshResponse, StartRefreshError> {
    let ticket = coordinator.start(command.source)?;

    tracing::info!(run_id = %ticket.run_id, "Data refresh accepted");

    Ok(StartRefreshResponse {
        run_id: ticket.run_id,
        status: "accepted".to_string(),
        message: "data refresh started".to_string(),
        started_at: ticket.started_at,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ingest::MemoryGateway;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_second_start_is_rejected_until_run_ends() {
        let gateway = MemoryGateway::gated();
        let coordinator = IngestionCoordinator::new(Arc::new(gateway.clone()), 10);
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "header\nO1,P1,C1,Shoe,Shoes,EU,2024-01-01,1,10,0,0,Card,Ann,a@x.io,Street\n",
        )
        .unwrap();

        let command = StartRefreshCommand {
            source: file.path().to_path_buf(),
        };
        let accepted = handle(&coordinator, command.clone()).unwrap();
        assert_eq!(accepted.status, "accepted");
        assert_eq!(coordinator.status().run_id, Some(accepted.run_id));

        let err = handle(&coordinator, command).unwrap_err();
        assert_eq!(
            err.to_string(),
            "data refresh is already in progress, please try again later"
        );

        gateway.release(1);
    }
}
