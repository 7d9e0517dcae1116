//! Scheduled refresh
//!
//! Sleeps until each upcoming fire time of a cron expression and asks the
//! coordinator to start a run. A tick that lands while a run is still going is
//! skipped with a warning.

use chrono::Utc;
use cron::Schedule;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::coordinator::{IngestionCoordinator, StartError};

/// Parse a cron expression, prepending a seconds field to 5-field input
///
/// The `cron` crate expects `sec min hour dom month dow [year]`; the usual
/// crontab form omits seconds.
pub fn parse_cron(expr: &str) -> Result<Schedule, cron::error::Error> {
    if expr.split_whitespace().count() == 5 {
        Schedule::from_str(&format!("0 {}", expr))
    } else {
        Schedule::from_str(expr)
    }
}

pub struct RefreshScheduler {
    schedule: Schedule,
    coordinator: IngestionCoordinator,
    csv_path: PathBuf,
}

impl RefreshScheduler {
    pub fn new(
        expr: &str,
        coordinator: IngestionCoordinator,
        csv_path: PathBuf,
    ) -> Result<Self, cron::error::Error> {
        Ok(Self {
            schedule: parse_cron(expr)?,
            coordinator,
            csv_path,
        })
    }

    /// Run the schedule in the background until the handle is aborted
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(csv_path = %self.csv_path.display(), "Refresh scheduler started");

            while let Some(next) = self.schedule.upcoming(Utc).next() {
                let wait = (next - Utc::now()).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;
                self.fire();
            }

            info!("Refresh schedule has no further fire times");
        })
    }

    fn fire(&self) {
        match self.coordinator.start(self.csv_path.clone()) {
            Ok(ticket) => info!(run_id = %ticket.run_id, "Scheduled refresh started"),
            Err(StartError::AlreadyRunning) => {
                warn!("Scheduled refresh skipped: a refresh is already in progress")
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ingest::gateway::MemoryGateway;
    use std::sync::Arc;

    #[test]
    fn test_parse_cron_five_field_auto_prefix() {
        let schedule = parse_cron("0 2 * * *").unwrap();
        let next = schedule.upcoming(Utc).next().unwrap();
        assert_eq!(next.format("%H:%M:%S").to_string(), "02:00:00");
    }

    #[test]
    fn test_parse_cron_six_field() {
        assert!(parse_cron("30 */5 * * * *").is_ok());
    }

    #[test]
    fn test_parse_cron_invalid() {
        assert!(parse_cron("whenever").is_err());
        assert!(RefreshScheduler::new(
            "61 * * * *",
            IngestionCoordinator::new(Arc::new(MemoryGateway::new()), 10),
            PathBuf::from("sales.csv"),
        )
        .is_err());
    }

    #[tokio::test]
    async fn test_fire_while_running_is_skipped() {
        let gateway = MemoryGateway::gated();
        let coordinator = IngestionCoordinator::new(Arc::new(gateway.clone()), 10);
        let scheduler = RefreshScheduler::new(
            "0 0 * * *",
            coordinator.clone(),
            PathBuf::from("/no/such/file.csv"),
        )
        .unwrap();

        let ticket = coordinator.start(b"header\n".to_vec()).unwrap();
        scheduler.fire();

        // The running run is untouched by the skipped tick.
        assert_eq!(coordinator.status().run_id, Some(ticket.run_id));
    }
}
