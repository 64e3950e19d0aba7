// Render style value object

use serde::{Deserialize, Serialize};

use crate::value_objects::Color;

pub const CREDENTIAL_FOREGROUND: Color = Color::rgb(0x00, 0xFF, 0xFF);
pub const CREDENTIAL_BACKGROUND: Color = Color::rgb(0x0F, 0x17, 0x2A);
pub const CREDENTIAL_SIZE: u32 = 300;
pub const CREDENTIAL_MARGIN: u32 = 2;

/// How a credential symbol is drawn: module colors, square image side in
/// pixels, and quiet-zone width in modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStyle {
    pub foreground: Color,
    pub background: Color,
    pub size: u32,
    pub margin: u32,
}

impl RenderStyle {
    /// Cyan-on-dark scheme used for issued credentials.
    pub fn credential() -> Self {
        Self {
            foreground: CREDENTIAL_FOREGROUND,
            background: CREDENTIAL_BACKGROUND,
            size: CREDENTIAL_SIZE,
            margin: CREDENTIAL_MARGIN,
        }
    }

    /// Black-on-white, handy for printing.
    pub fn mono(size: u32, margin: u32) -> Self {
        Self {
            foreground: Color::rgb(0, 0, 0),
            background: Color::rgb(0xFF, 0xFF, 0xFF),
            size,
            margin,
        }
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::credential()
    }
}
