use std::sync::Arc;
use std::time::Duration;

use attendance_domain::ports::IdentityProvider;
use attendance_domain::{AttendanceRecord, ConnectivityStatus, IdentityPayload};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::commands::AttendanceRecorder;
use crate::ops::{ConnectivityMonitor, Notice, ScanError, ScanSession, ScanState};
use crate::AppError;

pub const ATTENDANCE_SUCCESS_NOTICE: &str = "Attendance marked successfully!";

/// Volunteer-side flow: preflight, scan, confirm, and back to scanning.
///
/// Owns its scan session; dropping or closing the desk frees the camera.
pub struct ScannerDesk {
    session: ScanSession,
    recorder: AttendanceRecorder,
    identity: Arc<dyn IdentityProvider>,
    reset_delay: Duration,
    pending_reset: Option<Instant>,
}

impl ScannerDesk {
    pub fn new(
        session: ScanSession,
        recorder: AttendanceRecorder,
        identity: Arc<dyn IdentityProvider>,
        reset_delay: Duration,
    ) -> Self {
        Self {
            session,
            recorder,
            identity,
            reset_delay,
            pending_reset: None,
        }
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ScanSession {
        &mut self.session
    }

    /// Runs the connectivity preflight and starts the camera. A failed
    /// preflight does not stop scanning; it only blocks writes.
    pub async fn open(&mut self, cancel: &CancellationToken) -> Result<ConnectivityStatus, AppError> {
        let status = self.recorder.check_connectivity(cancel).await;
        if let Some(banner) = ConnectivityMonitor::banner(status) {
            self.session.set_notice(Some(Notice::error(banner)));
        }
        if self.session.state() == ScanState::Idle {
            self.session.start().await?;
        }
        Ok(status)
    }

    /// Waits for the next participant. If the previous write succeeded, the
    /// automatic return to scanning happens here once the delay has passed.
    pub async fn scan(&mut self, cancel: &CancellationToken) -> Result<IdentityPayload, AppError> {
        if let Some(deadline) = self.pending_reset {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ScanError::Cancelled.into()),
                _ = tokio::time::sleep_until(deadline) => {}
            }
            self.settle();
        }
        Ok(self.session.run(cancel).await?)
    }

    /// Applies a due automatic reset: once the delay after a successful
    /// write has passed, the recorded capture is dropped and the session is
    /// back to `Idle`. Returns the session state afterwards.
    pub fn settle(&mut self) -> ScanState {
        if let Some(deadline) = self.pending_reset {
            if Instant::now() >= deadline {
                self.pending_reset = None;
                self.session.reset();
            }
        }
        self.session.state()
    }

    /// Marks attendance for the captured participant. On failure the
    /// capture is kept so the operator can retry without rescanning.
    ///
    /// A capture is written at most once: after a successful write, further
    /// calls report `NothingCaptured` until the next scan.
    pub async fn confirm(&mut self, cancel: &CancellationToken) -> Result<AttendanceRecord, AppError> {
        self.settle();
        if self.pending_reset.is_some() {
            return Err(ScanError::NothingCaptured.into());
        }
        let payload = self
            .session
            .captured()
            .cloned()
            .ok_or(ScanError::NothingCaptured)?;
        let volunteer = self.identity.current_user().ok_or(AppError::Unauthorized)?;

        match self.recorder.mark_attendance(&payload, &volunteer, cancel).await {
            Ok(record) => {
                self.session
                    .set_notice(Some(Notice::success(ATTENDANCE_SUCCESS_NOTICE)));
                self.pending_reset = Some(Instant::now() + self.reset_delay);
                Ok(record)
            }
            Err(err) => {
                self.session.set_notice(Some(Notice::error(err.to_string())));
                Err(err.into())
            }
        }
    }

    /// Operator pressed "scan another": drop the capture and scan again now.
    pub async fn scan_another(&mut self) -> Result<(), AppError> {
        self.pending_reset = None;
        self.session.rescan().await?;
        Ok(())
    }

    pub fn close(&mut self) {
        self.pending_reset = None;
        self.session.release();
        info!("scanner desk closed");
    }
}
