// Hand-written port fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use attendance_domain::ports::{
    AttendanceRepository, CameraDevice, CaptureStream, CredentialArchive, CredentialRenderer,
    FrameDecoder, IdentityProvider,
};
use attendance_domain::{
    AttendanceRecord, CaptureConfig, DeviceCapabilities, Frame, NewAttendanceRecord,
    RenderStyle, UserIdentity,
};

#[derive(Default)]
pub struct FakeRepository {
    rows: Mutex<Vec<AttendanceRecord>>,
    inserts: AtomicUsize,
    counts: AtomicUsize,
    lookups: AtomicUsize,
    unreachable: bool,
    insert_error: Option<String>,
}

impl FakeRepository {
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn rejecting_inserts(message: &str) -> Self {
        Self {
            insert_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn count_calls(&self) -> usize {
        self.counts.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<AttendanceRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttendanceRepository for FakeRepository {
    async fn insert(&self, record: &NewAttendanceRecord) -> anyhow::Result<AttendanceRecord> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.insert_error {
            return Err(anyhow!("{}", message));
        }
        let mut rows = self.rows.lock().unwrap();
        let mut saved = AttendanceRecord::unsaved(record.clone());
        saved.id = Some((rows.len() + 1).to_string());
        saved.marked_at = Some("2025-03-01T09:30:00.000Z".to_string());
        rows.push(saved.clone());
        Ok(saved)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        self.counts.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.rows.lock().unwrap().len() as u64)
    }

    async fn find_by_registration(
        &self,
        event_name: &str,
        registration_number: &str,
    ) -> anyhow::Result<Option<AttendanceRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| {
                row.registration_number == registration_number
                    && row.event_name.as_deref() == Some(event_name)
            })
            .cloned())
    }
}

/// Renders the text itself as the "image", so tests can read it back.
pub struct EchoRenderer;

impl CredentialRenderer for EchoRenderer {
    fn render(&self, text: &str, _style: &RenderStyle) -> anyhow::Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }
}

#[derive(Default)]
pub struct MemoryArchive {
    pub files: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl CredentialArchive for MemoryArchive {
    async fn retain(&self, file_name: &str, bytes: &[u8]) -> anyhow::Result<String> {
        self.files
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(format!("memory://{}", file_name))
    }
}

/// Frames whose pixel buffer is just the text a real decoder would find.
pub fn text_frame(text: &str) -> Frame {
    Frame::new(1, 1, text.as_bytes().to_vec())
}

pub fn blank_frame() -> Frame {
    Frame::new(1, 1, Vec::new())
}

pub struct TextFrameDecoder;

impl FrameDecoder for TextFrameDecoder {
    fn decode(&self, frame: &Frame) -> anyhow::Result<String> {
        if frame.rgb.is_empty() {
            return Err(anyhow!("no symbol found"));
        }
        Ok(String::from_utf8(frame.rgb.clone())?)
    }
}

#[derive(Clone, Default)]
pub struct CameraProbe {
    pub opened: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
    pub delivered: Arc<AtomicUsize>,
    pub torch: Arc<Mutex<Option<bool>>>,
    pub zoom: Arc<Mutex<Option<f32>>>,
}

impl CameraProbe {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

pub struct ScriptedCamera {
    script: Mutex<VecDeque<Frame>>,
    /// Keep the stream open (pending) after the script runs out.
    hold_open: bool,
    capabilities: DeviceCapabilities,
    pub probe: CameraProbe,
}

impl ScriptedCamera {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            script: Mutex::new(frames.into()),
            hold_open: false,
            capabilities: DeviceCapabilities::default(),
            probe: CameraProbe::default(),
        }
    }

    pub fn held_open(frames: Vec<Frame>) -> Self {
        Self {
            hold_open: true,
            ..Self::new(frames)
        }
    }

    pub fn with_capabilities(mut self, capabilities: DeviceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn push(&self, frame: Frame) {
        self.script.lock().unwrap().push_back(frame);
    }
}

#[async_trait]
impl CameraDevice for ScriptedCamera {
    async fn open(&self, _config: &CaptureConfig) -> anyhow::Result<Box<dyn CaptureStream>> {
        self.probe.opened.fetch_add(1, Ordering::SeqCst);
        let frames: Vec<Frame> = self.script.lock().unwrap().drain(..).collect();
        Ok(Box::new(ScriptedStream {
            frames: frames.into(),
            hold_open: self.hold_open,
            capabilities: self.capabilities,
            probe: self.probe.clone(),
            released: false,
        }))
    }
}

struct ScriptedStream {
    frames: VecDeque<Frame>,
    hold_open: bool,
    capabilities: DeviceCapabilities,
    probe: CameraProbe,
    released: bool,
}

#[async_trait]
impl CaptureStream for ScriptedStream {
    async fn next_frame(&mut self) -> Option<anyhow::Result<Frame>> {
        match self.frames.pop_front() {
            Some(frame) => {
                self.probe.delivered.fetch_add(1, Ordering::SeqCst);
                Some(Ok(frame))
            }
            None if self.hold_open => std::future::pending().await,
            None => None,
        }
    }

    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn set_torch(&mut self, on: bool) -> anyhow::Result<()> {
        *self.probe.torch.lock().unwrap() = Some(on);
        Ok(())
    }

    fn set_zoom(&mut self, level: f32) -> anyhow::Result<()> {
        *self.probe.zoom.lock().unwrap() = Some(level);
        Ok(())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.probe.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct FixedIdentity(pub Option<UserIdentity>);

impl IdentityProvider for FixedIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.0.clone()
    }
}
