/*
   Unix Azure Entra ID implementation
   Copyright (C) David Mulder <dmulder@samba.org> 2024

   This program is free software; you can redistribute it and/or modify
   it under the terms of the GNU General Public License as published by
   the Free Software Foundation; either version 3 of the License, or
   (at your option) any later version.

   This program is distributed in the hope that it will be useful,
   but WITHOUT ANY WARRANTY; without even the implied warranty of
   MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
   GNU General Public License for more details.

   You should have received a copy of the GNU General Public License
   along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use crate::constants::{DEFAULT_SYNC_INTERVAL, DEFAULT_SYNC_TIMEOUT};
use crate::error::SyncError;
use graph::{GraphApi, SyncStatusCode};
use std::time::Duration;
use tokio::time;
use tracing::{debug, info};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Starting,
    Waiting,
    Resolved,
}

/// How long to wait after starting the job before sampling its status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            timeout: Duration::from_secs(DEFAULT_SYNC_TIMEOUT),
            interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL),
        }
    }
}

impl SyncSettings {
    /// The sleep per iteration. A zero interval, or one longer than the
    /// timeout, collapses the wait into a single sleep.
    fn step(&self) -> Duration {
        if self.interval.is_zero() || self.interval > self.timeout {
            self.timeout
        } else {
            self.interval
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub job_id: String,
    /// The status sampled after the wait. Anything but quarantine counts as
    /// success, even though the job may still be running.
    pub status: SyncStatusCode,
}

/// Starts the application's provisioning job and waits out a fixed grace
/// period before reading its status once.
///
/// The job status cannot tell a finished cycle from a scheduled one, so
/// there is no early exit while waiting, and the wait cannot be cancelled.
pub struct SyncOrchestrator<'a> {
    graph: &'a dyn GraphApi,
    service_principal_id: &'a str,
    settings: SyncSettings,
    state: SyncState,
}

impl<'a> SyncOrchestrator<'a> {
    pub fn new(
        graph: &'a dyn GraphApi,
        service_principal_id: &'a str,
        settings: SyncSettings,
    ) -> SyncOrchestrator<'a> {
        SyncOrchestrator {
            graph,
            service_principal_id,
            settings,
            state: SyncState::Idle,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub async fn run(&mut self) -> Result<SyncOutcome, SyncError> {
        self.state = SyncState::Starting;
        // The application is expected to have exactly one provisioning job.
        let job_id = self
            .graph
            .sync_job_ids(self.service_principal_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SyncError::NoSyncJob(self.service_principal_id.to_string()))?;
        debug!("Sync Job ID: \"{}\".", job_id);

        info!("Starting sync job.");
        self.graph
            .start_sync_job(self.service_principal_id, &job_id)
            .await?;

        self.state = SyncState::Waiting;
        self.wait().await;

        let status = self
            .graph
            .sync_job_status(self.service_principal_id, &job_id)
            .await?;
        self.state = SyncState::Resolved;
        debug!("Sync job {} in state \"{}\"", job_id, status);

        if status == SyncStatusCode::Quarantine {
            return Err(SyncError::Quarantine { job_id, status });
        }
        Ok(SyncOutcome { job_id, status })
    }

    async fn wait(&self) {
        let step = self.settings.step();
        info!(
            "Waiting {} seconds(s) for sync.",
            self.settings.timeout.as_secs()
        );
        let mut slept = Duration::ZERO;
        while slept < self.settings.timeout {
            info!("...");
            slept += step;
            time::sleep(step).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeDirectory};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_active_status_is_success() {
        let graph = FakeDirectory::new().with_status("Active");
        let mut sync = SyncOrchestrator::new(&graph, "sp", SyncSettings::default());
        assert_eq!(sync.state(), SyncState::Idle);

        let start = Instant::now();
        let outcome = sync.run().await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(60));
        assert!(start.elapsed() < Duration::from_secs(61));
        assert_eq!(outcome.job_id, "job1");
        assert_eq!(outcome.status, SyncStatusCode::Active);
        assert_eq!(sync.state(), SyncState::Resolved);
        assert_eq!(
            graph.calls(),
            vec![
                Call::ListJobs("sp".to_string()),
                Call::Start("job1".to_string()),
                Call::Status("job1".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_quarantine_is_fatal() {
        let graph = FakeDirectory::new().with_status("Quarantine");
        let mut sync = SyncOrchestrator::new(&graph, "sp", SyncSettings::default());

        let err = sync.run().await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Quarantine { ref job_id, .. } if job_id == "job1"
        ));
        assert_eq!(err.to_string(), "Sync job in state \"Quarantine\". Exiting.");
        assert_eq!(graph.count(|c| matches!(c, Call::Status(_))), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_is_success() {
        let graph = FakeDirectory::new().with_status("SomethingNew");
        let mut sync = SyncOrchestrator::new(&graph, "sp", SyncSettings::default());
        let outcome = sync.run().await.unwrap();
        assert_eq!(
            outcome.status,
            SyncStatusCode::Other("SomethingNew".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_job_is_used() {
        let graph = FakeDirectory::new().with_jobs(&["first", "second"]);
        let mut sync = SyncOrchestrator::new(&graph, "sp", SyncSettings::default());
        assert_eq!(sync.run().await.unwrap().job_id, "first");
        assert!(graph.calls().contains(&Call::Start("first".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_job() {
        let graph = FakeDirectory::new().with_jobs(&[]);
        let mut sync = SyncOrchestrator::new(&graph, "sp", SyncSettings::default());
        assert!(matches!(sync.run().await, Err(SyncError::NoSyncJob(_))));
        assert_eq!(graph.count(|c| matches!(c, Call::Start(_))), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_wait() {
        let graph = FakeDirectory::new();
        let settings = SyncSettings {
            timeout: Duration::from_secs(10),
            interval: Duration::from_secs(0),
        };
        let mut sync = SyncOrchestrator::new(&graph, "sp", settings);
        let start = Instant::now();
        sync.run().await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(11));
    }

    #[test]
    fn test_step() {
        let settings = SyncSettings {
            timeout: Duration::from_secs(3),
            interval: Duration::from_secs(5),
        };
        assert_eq!(settings.step(), Duration::from_secs(3));
        assert_eq!(SyncSettings::default().step(), Duration::from_secs(5));
    }
}
