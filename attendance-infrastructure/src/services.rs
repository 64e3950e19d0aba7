pub mod identity;
pub mod image_camera;
pub mod qr_codec;

pub use identity::*;
pub use image_camera::*;
pub use qr_codec::*;
