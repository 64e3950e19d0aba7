use std::sync::Arc;

use attendance_domain::ports::AttendanceRepository;
use attendance_domain::ConnectivityStatus;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const CONNECTION_FAILED_BANNER: &str =
    "Database connection failed. Please check your datastore configuration.";

/// Tracks the last datastore preflight outcome. Attendance writes read the
/// stored status instead of probing again.
pub struct ConnectivityMonitor {
    repo: Arc<dyn AttendanceRepository>,
    status: RwLock<ConnectivityStatus>,
}

impl ConnectivityMonitor {
    pub fn new(repo: Arc<dyn AttendanceRepository>) -> Self {
        Self {
            repo,
            status: RwLock::new(ConnectivityStatus::Checking),
        }
    }

    pub async fn status(&self) -> ConnectivityStatus {
        *self.status.read().await
    }

    /// Runs the count probe. A cancelled probe leaves the status at
    /// `Checking`, which still blocks writes.
    pub async fn check(&self, cancel: &CancellationToken) -> ConnectivityStatus {
        *self.status.write().await = ConnectivityStatus::Checking;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return ConnectivityStatus::Checking,
            outcome = self.repo.count() => outcome,
        };
        let status = match outcome {
            Ok(_) => {
                info!("datastore connectivity check passed");
                ConnectivityStatus::Connected
            }
            Err(err) => {
                warn!("datastore connectivity check failed: {}", err);
                ConnectivityStatus::Error
            }
        };
        *self.status.write().await = status;
        status
    }

    /// Records a probe that failed outside `check`, such as one abandoned
    /// after a timeout.
    pub async fn mark_failed(&self, reason: &str) {
        warn!("datastore connectivity check failed: {}", reason);
        *self.status.write().await = ConnectivityStatus::Error;
    }

    pub fn banner(status: ConnectivityStatus) -> Option<&'static str> {
        match status {
            ConnectivityStatus::Error => Some(CONNECTION_FAILED_BANNER),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRepository;

    #[tokio::test]
    async fn starts_in_checking_and_moves_to_connected() {
        let repo = Arc::new(FakeRepository::default());
        let monitor = ConnectivityMonitor::new(repo.clone());
        assert_eq!(monitor.status().await, ConnectivityStatus::Checking);

        let status = monitor.check(&CancellationToken::new()).await;
        assert_eq!(status, ConnectivityStatus::Connected);
        assert_eq!(monitor.status().await, ConnectivityStatus::Connected);
        assert_eq!(repo.count_calls(), 1);
    }

    #[tokio::test]
    async fn failed_probe_reports_error_with_banner() {
        let repo = Arc::new(FakeRepository::unreachable());
        let monitor = ConnectivityMonitor::new(repo);
        let status = monitor.check(&CancellationToken::new()).await;
        assert_eq!(status, ConnectivityStatus::Error);
        assert_eq!(
            ConnectivityMonitor::banner(status),
            Some(CONNECTION_FAILED_BANNER)
        );
    }

    #[tokio::test]
    async fn abandoned_probe_can_be_marked_failed() {
        let monitor = ConnectivityMonitor::new(Arc::new(FakeRepository::default()));
        monitor.mark_failed("timed out").await;
        assert_eq!(monitor.status().await, ConnectivityStatus::Error);
    }

    #[tokio::test]
    async fn cancelled_probe_stays_checking() {
        let repo = Arc::new(FakeRepository::default());
        let monitor = ConnectivityMonitor::new(repo.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(monitor.check(&cancel).await, ConnectivityStatus::Checking);
        assert_eq!(monitor.status().await, ConnectivityStatus::Checking);
    }
}
