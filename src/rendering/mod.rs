//! Rendering: the raster canvas and the compositor that stitches tiles onto it

pub mod composite;
pub mod raster;

pub use raster::Canvas;

use sha2::{Digest, Sha256};

/// A finished, encoded full-page image
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    /// SHA-256 of the encoded image, hex encoded
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}
