use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use attendance_domain::ports::{CameraDevice, CaptureStream};
use attendance_domain::{CaptureConfig, DeviceCapabilities, Frame};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

type FrameQueue = Arc<Mutex<VecDeque<PathBuf>>>;

/// Frame source backed by still images: a single file, or every png/jpg in
/// a directory in lexical order. Has no torch and no zoom.
///
/// Images are consumed once across every stream the camera opens, the way a
/// real camera never shows the same moment twice.
pub struct ImageFileCamera {
    source: PathBuf,
    queue: Mutex<Option<FrameQueue>>,
}

impl ImageFileCamera {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            queue: Mutex::new(None),
        }
    }

    async fn shared_queue(&self) -> Result<FrameQueue> {
        let existing = self.lock_queue()?.clone();
        if let Some(queue) = existing {
            return Ok(queue);
        }
        let listed: FrameQueue = Arc::new(Mutex::new(self.list_frames().await?.into()));
        Ok(self.lock_queue()?.get_or_insert(listed).clone())
    }

    fn lock_queue(&self) -> Result<std::sync::MutexGuard<'_, Option<FrameQueue>>> {
        self.queue
            .lock()
            .map_err(|_| anyhow!("image camera state poisoned"))
    }

    async fn list_frames(&self) -> Result<Vec<PathBuf>> {
        let meta = fs::metadata(&self.source)
            .await
            .map_err(|err| anyhow!("cannot open {}: {}", self.source.display(), err))?;
        if meta.is_file() {
            return Ok(vec![self.source.clone()]);
        }

        let mut entries = fs::read_dir(&self.source).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        if paths.is_empty() {
            return Err(anyhow!("no png/jpg images in {}", self.source.display()));
        }
        Ok(paths)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[async_trait]
impl CameraDevice for ImageFileCamera {
    async fn open(&self, config: &CaptureConfig) -> Result<Box<dyn CaptureStream>> {
        let pending = self.shared_queue().await?;
        let remaining = pending.lock().map(|queue| queue.len()).unwrap_or(0);
        info!(
            "image camera opened: source={}, remaining={}, fps={}",
            self.source.display(),
            remaining,
            config.fps
        );
        Ok(Box::new(ImageFileStream {
            pending,
            released: false,
        }))
    }
}

struct ImageFileStream {
    pending: FrameQueue,
    released: bool,
}

async fn load_frame(path: PathBuf) -> Result<Frame> {
    let bytes = fs::read(&path).await?;
    let img = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await?
        .map_err(|err| anyhow!("{}: {}", path.display(), err))?
        .to_rgb8();
    Ok(Frame::new(img.width(), img.height(), img.into_raw()))
}

#[async_trait]
impl CaptureStream for ImageFileStream {
    async fn next_frame(&mut self) -> Option<Result<Frame>> {
        if self.released {
            return None;
        }
        let path = self.pending.lock().ok()?.pop_front()?;
        debug!("reading frame {}", path.display());
        Some(load_frame(path).await)
    }

    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities::default()
    }

    fn set_torch(&mut self, _on: bool) -> Result<()> {
        Err(anyhow!("image camera has no torch"))
    }

    fn set_zoom(&mut self, _level: f32) -> Result<()> {
        Err(anyhow!("image camera has no zoom"))
    }

    fn release(&mut self) {
        self.released = true;
    }
}
