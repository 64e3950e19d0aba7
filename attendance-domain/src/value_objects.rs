// Domain value objects
pub mod color;
pub mod render_style;

pub use color::*;
pub use render_style::*;
