use std::io::Cursor;

use anyhow::{anyhow, Result};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use qrism::reader::detect_qr;
use qrism::{ECLevel, QRBuilder};

use attendance_domain::ports::{CredentialRenderer, FrameDecoder};
use attendance_domain::{Frame, RenderStyle};

/// Dark/light split used when reading back module colors.
const LUMA_THRESHOLD: u32 = 128;

/// Square module matrix of an encoded symbol, row-major, `true` = dark.
struct ModuleGrid {
    side: u32,
    dark: Vec<bool>,
}

impl ModuleGrid {
    fn encode(text: &str) -> Result<Self> {
        let symbol = QRBuilder::new(text.as_bytes())
            .ec_level(ECLevel::M)
            .build()
            .map_err(|err| anyhow!("failed to encode credential: {}", err))?;
        // One pixel per module; the bounding box of dark pixels is the symbol
        // itself since finder patterns sit in three of its corners.
        let img = symbol.to_image(1);
        let (width, height) = (img.width(), img.height());
        let is_dark = |x: u32, y: u32| {
            let [r, g, b] = img.get_pixel(x, y).0;
            (u32::from(r) + u32::from(g) + u32::from(b)) / 3 < LUMA_THRESHOLD
        };

        let mut min = (u32::MAX, u32::MAX);
        let mut max = (0, 0);
        for y in 0..height {
            for x in 0..width {
                if is_dark(x, y) {
                    min = (min.0.min(x), min.1.min(y));
                    max = (max.0.max(x), max.1.max(y));
                }
            }
        }
        if min.0 > max.0 || min.1 > max.1 {
            return Err(anyhow!("encoder produced an empty symbol"));
        }

        let side = (max.0 - min.0 + 1).max(max.1 - min.1 + 1);
        let mut dark = Vec::with_capacity((side * side) as usize);
        for y in 0..side {
            for x in 0..side {
                let (px, py) = (min.0 + x, min.1 + y);
                dark.push(px < width && py < height && is_dark(px, py));
            }
        }
        Ok(Self { side, dark })
    }

    fn is_dark(&self, x: i64, y: i64) -> bool {
        let side = i64::from(self.side);
        if x < 0 || y < 0 || x >= side || y >= side {
            return false;
        }
        self.dark[(y * side + x) as usize]
    }
}

/// Draws credentials as QR symbols in the requested colors.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrCredentialRenderer;

impl QrCredentialRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_image(&self, text: &str, style: &RenderStyle) -> Result<RgbImage> {
        let grid = ModuleGrid::encode(text)?;
        let modules = grid.side + 2 * style.margin;
        let side = style.size.max(modules);
        let scale = f64::from(side) / f64::from(modules);
        let margin = i64::from(style.margin);
        let fg = Rgb(style.foreground.channels());
        let bg = Rgb(style.background.channels());

        Ok(RgbImage::from_fn(side, side, |x, y| {
            let mx = (f64::from(x) / scale).floor() as i64 - margin;
            let my = (f64::from(y) / scale).floor() as i64 - margin;
            if grid.is_dark(mx, my) {
                fg
            } else {
                bg
            }
        }))
    }
}

impl CredentialRenderer for QrCredentialRenderer {
    fn render(&self, text: &str, style: &RenderStyle) -> Result<Vec<u8>> {
        let img = self.render_image(text, style)?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Reads the first QR symbol in a frame.
///
/// Light-on-dark credentials are retried with the frame inverted.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrFrameDecoder;

impl QrFrameDecoder {
    pub fn new() -> Self {
        Self
    }

    fn decode_image(img: RgbImage) -> Result<String> {
        let mut found = detect_qr(&DynamicImage::ImageRgb8(img));
        let symbol = found
            .symbols()
            .first_mut()
            .ok_or_else(|| anyhow!("no QR symbol in frame"))?;
        let (_, text) = symbol
            .decode()
            .map_err(|err| anyhow!("unreadable QR symbol: {}", err))?;
        Ok(text)
    }
}

impl FrameDecoder for QrFrameDecoder {
    fn decode(&self, frame: &Frame) -> Result<String> {
        if !frame.is_well_formed() {
            return Err(anyhow!(
                "malformed frame {}x{} with {} bytes",
                frame.width,
                frame.height,
                frame.rgb.len()
            ));
        }
        let mut img = RgbImage::from_raw(frame.width, frame.height, frame.rgb.clone())
            .ok_or_else(|| anyhow!("frame buffer does not match its size"))?;
        match Self::decode_image(img.clone()) {
            Ok(text) => Ok(text),
            Err(first) => {
                image::imageops::invert(&mut img);
                Self::decode_image(img).map_err(|_| first)
            }
        }
    }
}
