use std::sync::Arc;

use attendance_domain::ports::AttendanceRepository;
use attendance_domain::{
    AttendanceRecord, ConnectivityStatus, IdentityPayload, NewAttendanceRecord, UserIdentity,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ops::ConnectivityMonitor;
use crate::Metrics;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecorderError {
    #[error("Database not connected. Please refresh the page and try again.")]
    NotConnected,
    #[error("Attendance already marked for {registration_number} by {marked_by}")]
    AlreadyMarked {
        registration_number: String,
        marked_by: String,
    },
    #[error("Database error: {0}")]
    Datastore(String),
    #[error("attendance write was cancelled")]
    Cancelled,
}

/// Writes one attendance row per confirmed scan.
#[derive(Clone)]
pub struct AttendanceRecorder {
    repo: Arc<dyn AttendanceRepository>,
    connectivity: Arc<ConnectivityMonitor>,
    event_name: String,
    duplicate_check: bool,
    metrics: Arc<Metrics>,
}

impl AttendanceRecorder {
    pub fn new(
        repo: Arc<dyn AttendanceRepository>,
        connectivity: Arc<ConnectivityMonitor>,
        event_name: String,
        duplicate_check: bool,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            repo,
            connectivity,
            event_name,
            duplicate_check,
            metrics,
        }
    }

    pub fn connectivity(&self) -> &Arc<ConnectivityMonitor> {
        &self.connectivity
    }

    /// Preflight probe; its outcome gates every later `mark_attendance`.
    pub async fn check_connectivity(&self, cancel: &CancellationToken) -> ConnectivityStatus {
        self.connectivity.check(cancel).await
    }

    /// Records attendance for a decoded credential.
    ///
    /// Refused locally, without touching the datastore, unless the last
    /// preflight reported `connected`. With the duplicate check on, an
    /// existing row for the same registration number and event wins.
    pub async fn mark_attendance(
        &self,
        payload: &IdentityPayload,
        volunteer: &UserIdentity,
        cancel: &CancellationToken,
    ) -> Result<AttendanceRecord, RecorderError> {
        if !self.connectivity.status().await.is_connected() {
            warn!(
                "attendance refused, datastore not connected: registration_number={}",
                payload.registration_number
            );
            return Err(RecorderError::NotConnected);
        }

        let record = NewAttendanceRecord::from_scan(payload, volunteer, &self.event_name);

        if self.duplicate_check {
            let existing = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RecorderError::Cancelled),
                found = self.repo.find_by_registration(&record.event_name, &record.registration_number) => found,
            };
            match existing {
                Ok(Some(row)) => {
                    info!(
                        "attendance already marked: registration_number={}",
                        row.registration_number
                    );
                    return Err(RecorderError::AlreadyMarked {
                        registration_number: row.registration_number,
                        marked_by: row.marked_by_volunteer,
                    });
                }
                Ok(None) => {}
                Err(err) => return Err(self.datastore_failure(err)),
            }
        }

        let inserted = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RecorderError::Cancelled),
            inserted = self.repo.insert(&record) => inserted,
        };

        match inserted {
            Ok(saved) => {
                self.metrics.record_attendance();
                info!(
                    "attendance marked: registration_number={}, volunteer={}",
                    saved.registration_number, saved.marked_by_volunteer
                );
                Ok(saved)
            }
            Err(err) => Err(self.datastore_failure(err)),
        }
    }

    fn datastore_failure(&self, err: anyhow::Error) -> RecorderError {
        warn!("attendance write failed: {}", err);
        self.metrics.record_attendance_error();
        RecorderError::Datastore(err.to_string())
    }
}
