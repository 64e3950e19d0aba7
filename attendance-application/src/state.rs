use std::sync::Arc;
use std::time::Duration;

use attendance_domain::ports::{
    AttendanceRepository, CameraDevice, CredentialArchive, CredentialRenderer, FrameDecoder,
    IdentityProvider,
};
use attendance_domain::RuntimeConfig;
use tokio_util::sync::CancellationToken;

use crate::commands::{AttendanceRecorder, CredentialIssuer};
use crate::ops::{ConnectivityMonitor, ScanSession, ScannerDesk};
use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub attendance_repo: Arc<dyn AttendanceRepository>,
    pub renderer: Arc<dyn CredentialRenderer>,
    pub archive: Arc<dyn CredentialArchive>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub metrics: Arc<Metrics>,
    /// Cancelled on shutdown; every in-flight encode, probe and insert
    /// listens on a child of it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        config: RuntimeConfig,
        attendance_repo: Arc<dyn AttendanceRepository>,
        renderer: Arc<dyn CredentialRenderer>,
        archive: Arc<dyn CredentialArchive>,
    ) -> Self {
        let connectivity = Arc::new(ConnectivityMonitor::new(attendance_repo.clone()));
        Self {
            config,
            attendance_repo,
            renderer,
            archive,
            connectivity,
            metrics: Arc::new(Metrics::default()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Fresh issuer with its own session-local credential slot.
    pub fn issuer(&self) -> CredentialIssuer {
        CredentialIssuer::new(
            self.renderer.clone(),
            self.archive.clone(),
            self.config.event_name.clone(),
            self.config.credential_file_prefix.clone(),
            self.config.render_style,
            self.metrics.clone(),
        )
    }

    pub fn recorder(&self) -> AttendanceRecorder {
        AttendanceRecorder::new(
            self.attendance_repo.clone(),
            self.connectivity.clone(),
            self.config.event_name.clone(),
            self.config.duplicate_check,
            self.metrics.clone(),
        )
    }

    pub fn scanner_desk(
        &self,
        camera: Arc<dyn CameraDevice>,
        decoder: Arc<dyn FrameDecoder>,
        identity: Arc<dyn IdentityProvider>,
    ) -> ScannerDesk {
        let session = ScanSession::new(camera, decoder, self.config.capture.clone())
            .with_metrics(self.metrics.clone());
        ScannerDesk::new(
            session,
            self.recorder(),
            identity,
            Duration::from_millis(self.config.reset_delay_ms),
        )
    }
}
