//! Raster canvas: a fixed-size RGBA buffer that encoded images are laid onto

use std::io::Cursor;

use image::{imageops, ImageFormat, Rgba, RgbaImage};

use crate::{Error, Result};

/// Opaque white, the background of every stitched page
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Largest canvas allocated, in pixels (1 GiB of RGBA)
pub const MAX_CANVAS_PIXELS: u64 = 256 * 1024 * 1024;

/// Check that a `width` x `height` canvas can be allocated.
///
/// Height 0 is [`Error::EmptyPage`]; a zero width or a canvas above
/// [`MAX_CANVAS_PIXELS`] is [`Error::CompositeError`].
pub fn ensure_canvas_fits(width: u32, height: u32) -> Result<()> {
    if height == 0 {
        return Err(Error::EmptyPage(0));
    }
    if width == 0 {
        return Err(Error::CompositeError("canvas width must be positive".into()));
    }
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_CANVAS_PIXELS {
        return Err(Error::CompositeError(format!(
            "a {}x{} canvas exceeds the {} pixel limit",
            width, height, MAX_CANVAS_PIXELS
        )));
    }
    Ok(())
}

/// Decode an encoded tile into RGBA pixels.
pub fn decode_tile(encoded: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(encoded)
        .map(|img| img.to_rgba8())
        .map_err(|e| Error::CompositeError(format!("failed to decode tile: {}", e)))
}

pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// Allocate a `width` x `height` canvas filled with `background`.
    ///
    /// Sizes are checked with [`ensure_canvas_fits`] before anything is
    /// allocated.
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Result<Self> {
        ensure_canvas_fits(width, height)?;
        Ok(Self {
            pixels: RgbaImage::from_pixel(width, height, background),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }

    /// Lay `layer` over the canvas with its top-left corner at (`x`, `y`).
    /// Whatever falls outside the canvas is dropped.
    pub fn overlay(&mut self, layer: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(&mut self.pixels, layer, x, y);
    }

    /// Encode the canvas as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| Error::EncodeError(format!("failed to encode PNG: {}", e)))?;
        Ok(out.into_inner())
    }
}
