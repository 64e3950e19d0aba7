// Camera capture entities

use serde::{Deserialize, Serialize};

/// One sampled camera frame, packed RGB8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Self {
        Self { width, height, rgb }
    }

    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgb.len() == self.width as usize * self.height as usize * 3
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Target frame samples per second.
    pub fps: u32,
    /// Side of the square detection box, in viewport pixels.
    pub box_size: u32,
    pub aspect_ratio: f32,
    pub show_torch_if_supported: bool,
    pub show_zoom_if_supported: bool,
    pub default_zoom: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            box_size: 250,
            aspect_ratio: 1.0,
            show_torch_if_supported: true,
            show_zoom_if_supported: true,
            default_zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub torch: bool,
    /// `(min, max)` zoom range when the device supports zooming.
    pub zoom: Option<(f32, f32)>,
}
