use async_trait::async_trait;

use crate::entities::{CaptureConfig, DeviceCapabilities, Frame, UserIdentity};
use crate::value_objects::RenderStyle;

/// Draws a 2-D optical code for `text` and returns PNG bytes.
pub trait CredentialRenderer: Send + Sync {
    fn render(&self, text: &str, style: &RenderStyle) -> anyhow::Result<Vec<u8>>;
}

/// Pulls the embedded text out of one camera frame.
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, frame: &Frame) -> anyhow::Result<String>;
}

#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(&self, config: &CaptureConfig) -> anyhow::Result<Box<dyn CaptureStream>>;
}

/// An acquired camera. Holding one means holding the device exclusively.
#[async_trait]
pub trait CaptureStream: Send {
    /// Next frame in delivery order; `None` once the device stops producing.
    async fn next_frame(&mut self) -> Option<anyhow::Result<Frame>>;
    fn capabilities(&self) -> DeviceCapabilities;
    fn set_torch(&mut self, on: bool) -> anyhow::Result<()>;
    fn set_zoom(&mut self, level: f32) -> anyhow::Result<()>;
    /// Gives the device back. Must tolerate being called more than once.
    fn release(&mut self);
}

pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<UserIdentity>;
}
