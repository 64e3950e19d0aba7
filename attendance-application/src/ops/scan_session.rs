use std::sync::Arc;
use std::time::Duration;

use attendance_domain::ports::{CameraDevice, CaptureStream, FrameDecoder};
use attendance_domain::{decode_payload, CaptureConfig, DecodeError, DeviceCapabilities, IdentityPayload};
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::Metrics;

pub const SCAN_SUCCESS_NOTICE: &str = "QR Code scanned successfully!";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("a capture session is already active")]
    AlreadyActive,
    #[error("camera unavailable: {0}")]
    Camera(String),
    #[error("camera stopped delivering frames")]
    StreamEnded,
    #[error("scan cancelled")]
    Cancelled,
    #[error("{0} is not supported by this camera")]
    Unsupported(&'static str),
    #[error("no participant has been scanned")]
    NothingCaptured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    Captured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Operator-facing message from the last scan event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Captured(IdentityPayload),
    /// Content was read but is not a usable credential; scanning goes on.
    Rejected(DecodeError),
    /// Not scanning any more, so the content was dropped.
    Ignored,
}

enum Step {
    Cancelled,
    Frame(Option<anyhow::Result<attendance_domain::Frame>>),
}

/// One camera-backed decode cycle: `Idle -> Scanning -> Captured`.
///
/// The session owns its capture stream exclusively and gives it back on the
/// first complete decode, on [`ScanSession::release`], and on drop.
pub struct ScanSession {
    camera: Arc<dyn CameraDevice>,
    decoder: Arc<dyn FrameDecoder>,
    config: CaptureConfig,
    metrics: Option<Arc<Metrics>>,
    stream: Option<Box<dyn CaptureStream>>,
    state: ScanState,
    captured: Option<IdentityPayload>,
    notice: Option<Notice>,
}

impl ScanSession {
    pub fn new(
        camera: Arc<dyn CameraDevice>,
        decoder: Arc<dyn FrameDecoder>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            camera,
            decoder,
            config,
            metrics: None,
            stream: None,
            state: ScanState::Idle,
            captured: None,
            notice: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn captured(&self) -> Option<&IdentityPayload> {
        self.captured.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Option<Notice>) {
        self.notice = notice;
    }

    pub fn is_acquired(&self) -> bool {
        self.stream.is_some()
    }

    /// Capabilities of the held camera, filtered by what the configuration
    /// allows to be shown.
    pub fn controls(&self) -> Option<DeviceCapabilities> {
        let stream = self.stream.as_ref()?;
        let caps = stream.capabilities();
        Some(DeviceCapabilities {
            torch: caps.torch && self.config.show_torch_if_supported,
            zoom: caps.zoom.filter(|_| self.config.show_zoom_if_supported),
        })
    }

    /// Acquires the camera and starts scanning.
    pub async fn start(&mut self) -> Result<(), ScanError> {
        if self.stream.is_some() {
            return Err(ScanError::AlreadyActive);
        }
        let mut stream = self
            .camera
            .open(&self.config)
            .await
            .map_err(|err| ScanError::Camera(err.to_string()))?;

        if self.config.show_zoom_if_supported && stream.capabilities().zoom.is_some() {
            if let Err(err) = stream.set_zoom(self.config.default_zoom) {
                warn!("failed to apply default zoom: {}", err);
            }
        }

        self.stream = Some(stream);
        self.state = ScanState::Scanning;
        self.captured = None;
        info!(
            "scan session started: fps={}, box={}",
            self.config.fps, self.config.box_size
        );
        Ok(())
    }

    /// Handles text read from one frame.
    ///
    /// The first complete payload moves the session to `Captured` and frees
    /// the camera before returning, so later frames are never acted on.
    /// Unusable content only updates the notice.
    pub fn on_decoded(&mut self, text: &str) -> ScanOutcome {
        if self.state != ScanState::Scanning {
            return ScanOutcome::Ignored;
        }
        match decode_payload(text) {
            Ok(payload) => {
                self.state = ScanState::Captured;
                self.captured = Some(payload.clone());
                self.notice = Some(Notice::success(SCAN_SUCCESS_NOTICE));
                self.release_stream();
                if let Some(metrics) = &self.metrics {
                    metrics.record_scan_decoded();
                }
                info!(
                    "credential captured: registration_number={}",
                    payload.registration_number
                );
                ScanOutcome::Captured(payload)
            }
            Err(err) => {
                debug!("rejected scanned content: {}", err);
                self.notice = Some(Notice::error(err.to_string()));
                if let Some(metrics) = &self.metrics {
                    metrics.record_scan_rejected();
                }
                ScanOutcome::Rejected(err)
            }
        }
    }

    /// Samples frames at the configured rate until a complete payload is
    /// captured. Starts the camera first when idle.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<IdentityPayload, ScanError> {
        match self.state {
            ScanState::Captured => {
                return self.captured.clone().ok_or(ScanError::NothingCaptured);
            }
            ScanState::Idle => self.start().await?,
            ScanState::Scanning => {}
        }

        let period = Duration::from_secs_f64(1.0 / f64::from(self.config.fps.max(1)));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let step = {
                let Some(stream) = self.stream.as_mut() else {
                    return Err(ScanError::StreamEnded);
                };
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Step::Cancelled,
                    _ = ticker.tick() => {
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => Step::Cancelled,
                            next = stream.next_frame() => Step::Frame(next),
                        }
                    }
                }
            };

            let frame = match step {
                Step::Cancelled => {
                    self.release();
                    return Err(ScanError::Cancelled);
                }
                Step::Frame(None) => {
                    self.release();
                    return Err(ScanError::StreamEnded);
                }
                Step::Frame(Some(Err(err))) => {
                    debug!("frame acquisition failed: {}", err);
                    continue;
                }
                Step::Frame(Some(Ok(frame))) => frame,
            };

            let text = match self.decoder.decode(&frame) {
                Ok(text) => text,
                Err(err) => {
                    debug!("no credential in frame: {}", err);
                    continue;
                }
            };

            if let ScanOutcome::Captured(payload) = self.on_decoded(&text) {
                return Ok(payload);
            }
        }
    }

    /// "Scan another": drops any captured participant without recording it
    /// and goes back to `Idle`.
    pub fn reset(&mut self) {
        self.release_stream();
        self.state = ScanState::Idle;
        self.captured = None;
        self.notice = None;
    }

    pub async fn rescan(&mut self) -> Result<(), ScanError> {
        self.reset();
        self.start().await
    }

    /// Gives the camera back. Safe to call in any state, any number of times.
    pub fn release(&mut self) {
        self.release_stream();
        if self.state == ScanState::Scanning {
            self.state = ScanState::Idle;
        }
    }

    pub fn set_torch(&mut self, on: bool) -> Result<(), ScanError> {
        let stream = self.stream.as_mut().ok_or(ScanError::Unsupported("torch"))?;
        if !stream.capabilities().torch {
            return Err(ScanError::Unsupported("torch"));
        }
        stream
            .set_torch(on)
            .map_err(|err| ScanError::Camera(err.to_string()))
    }

    pub fn set_zoom(&mut self, level: f32) -> Result<(), ScanError> {
        let stream = self.stream.as_mut().ok_or(ScanError::Unsupported("zoom"))?;
        let Some((min, max)) = stream.capabilities().zoom else {
            return Err(ScanError::Unsupported("zoom"));
        };
        stream
            .set_zoom(level.clamp(min, max))
            .map_err(|err| ScanError::Camera(err.to_string()))
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
            debug!("camera released");
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.release_stream();
    }
}
