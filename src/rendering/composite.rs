//! Stitch captured tiles into one page-sized image

use log::debug;

use crate::capture::Tile;
use crate::rendering::raster::{decode_tile, Canvas, WHITE};
use crate::rendering::Screenshot;
use crate::{Error, Result};

/// Composite `tiles` onto a `width` x `height` white canvas and encode it.
///
/// Every tile must decode to exactly `width` x `tile_height` pixels; a
/// narrower or shorter capture would leave white bands in the page, so it is
/// rejected with [`Error::CompositeError`]. Each tile is anchored at
/// (0, `tile.top`) and drawn in the order given, so a later tile wins where
/// two overlap. The last tile usually reaches past `height`; the overhang is
/// clipped, the canvas never grows.
pub fn compose(tiles: &[Tile], width: u32, height: u32, tile_height: u32) -> Result<Screenshot> {
    let mut canvas = Canvas::new(width, height, WHITE)?;

    for (index, tile) in tiles.iter().enumerate() {
        let layer = decode_tile(&tile.png)?;
        let (w, h) = layer.dimensions();
        if (w, h) != (width, tile_height) {
            return Err(Error::CompositeError(format!(
                "tile {} at y={} is {}x{}, expected {}x{}",
                index + 1,
                tile.top,
                w,
                h,
                width,
                tile_height
            )));
        }
        canvas.overlay(&layer, 0, i64::from(tile.top));
        let visible = h.min(height.saturating_sub(tile.top));
        debug!("Placed tile {} at y={} ({} of {} rows visible)", index + 1, tile.top, visible, h);
    }

    let png_data = canvas.encode_png()?;
    Ok(Screenshot {
        width,
        height,
        png_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn tile(top: u32, width: u32, height: u32, color: [u8; 4]) -> Tile {
        let mut out = Cursor::new(Vec::new());
        RgbaImage::from_pixel(width, height, Rgba(color))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        Tile { png: out.into_inner(), top }
    }

    fn decode(shot: &Screenshot) -> RgbaImage {
        image::load_from_memory(&shot.png_data).unwrap().to_rgba8()
    }

    #[test]
    fn last_tile_is_clipped_to_the_page() {
        let tiles = vec![
            tile(0, 10, 8, [255, 0, 0, 255]),
            tile(8, 10, 8, [0, 255, 0, 255]),
            tile(16, 10, 8, [0, 0, 255, 255]),
        ];
        let shot = compose(&tiles, 10, 20, 8).unwrap();
        assert_eq!((shot.width, shot.height), (10, 20));

        let img = decode(&shot);
        assert_eq!(img.dimensions(), (10, 20));
        assert_eq!(img.get_pixel(0, 7), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(0, 8), &Rgba([0, 255, 0, 255]));
        assert_eq!(img.get_pixel(9, 16), &Rgba([0, 0, 255, 255]));
        assert_eq!(img.get_pixel(9, 19), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn exact_fit_single_tile() {
        let shot = compose(&[tile(0, 6, 6, [1, 2, 3, 255])], 6, 6, 6).unwrap();
        let img = decode(&shot);
        assert!(img.pixels().all(|p| *p == Rgba([1, 2, 3, 255])));
    }

    #[test]
    fn narrower_tile_is_rejected() {
        let tiles = vec![tile(0, 10, 8, [0, 0, 0, 255]), tile(8, 7, 8, [0, 0, 0, 255])];
        match compose(&tiles, 10, 16, 8) {
            Err(Error::CompositeError(msg)) => {
                assert!(msg.contains("tile 2"), "{}", msg);
                assert!(msg.contains("7x8"), "{}", msg);
                assert!(msg.contains("expected 10x8"), "{}", msg);
            }
            other => panic!("expected a composite error, got {:?}", other.map(|s| s.height)),
        }
    }

    #[test]
    fn shorter_tile_is_rejected() {
        let shot = compose(&[tile(0, 4, 2, [0, 0, 0, 255])], 4, 5, 5);
        assert!(matches!(shot, Err(Error::CompositeError(_))));
    }

    #[test]
    fn short_tiles_do_not_leave_white_gaps() {
        // 713-row captures at an 800-row stride would leave 87 blank rows
        // under each of the first two tiles.
        let tiles = vec![
            tile(0, 8, 713, [0, 0, 0, 255]),
            tile(800, 8, 713, [0, 0, 0, 255]),
            tile(1600, 8, 713, [0, 0, 0, 255]),
        ];
        assert!(matches!(compose(&tiles, 8, 2000, 800), Err(Error::CompositeError(_))));
    }

    #[test]
    fn translucent_tiles_blend_onto_white() {
        let shot = compose(&[tile(0, 2, 2, [0, 0, 0, 0])], 2, 2, 2).unwrap();
        assert_eq!(decode(&shot).get_pixel(0, 0), &WHITE);
    }

    #[test]
    fn composing_twice_is_byte_identical() {
        let tiles = vec![tile(0, 8, 8, [10, 20, 30, 255]), tile(8, 8, 8, [40, 50, 60, 255])];
        let a = compose(&tiles, 8, 12, 8).unwrap();
        let b = compose(&tiles, 8, 12, 8).unwrap();
        assert_eq!(a.png_data, b.png_data);
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn no_tiles_on_an_empty_page_is_an_error() {
        assert!(matches!(compose(&[], 8, 0, 8), Err(Error::EmptyPage(0))));
    }

    #[test]
    fn corrupt_tile_fails() {
        let bad = Tile { png: vec![0, 1, 2, 3], top: 0 };
        assert!(matches!(compose(&[bad], 8, 8, 8), Err(Error::CompositeError(_))));
    }
}
