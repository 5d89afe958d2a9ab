//! Tile capture: scroll to each planned offset and grab the viewport

use std::time::Duration;

use log::{debug, info};

use crate::plan::CapturePlan;
use crate::prepare::settle;
use crate::{CaptureConfig, Error, PageDriver, Result};

/// One viewport capture and where it belongs on the final canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Encoded viewport capture (PNG)
    pub png: Vec<u8>,
    /// Vertical position of the tile's top edge on the canvas
    pub top: u32,
}

/// Mutable state of one capture run
///
/// The session owns the scroll offset and advances it one tile height per
/// capture, so every tile is placed by its own arithmetic rather than by
/// wherever the page actually ended up.
#[derive(Debug)]
pub struct CaptureSession {
    page_height: u32,
    tile_height: u32,
    scroll_settle: Duration,
    offset: u32,
    captured: usize,
}

impl CaptureSession {
    pub fn new(plan: &CapturePlan, config: &CaptureConfig) -> Self {
        Self {
            page_height: plan.page_height(),
            tile_height: plan.tile_height(),
            scroll_settle: config.scroll_settle(),
            offset: 0,
            captured: 0,
        }
    }

    /// Offset the next capture will scroll to
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn captured(&self) -> usize {
        self.captured
    }

    pub fn is_done(&self) -> bool {
        self.offset >= self.page_height
    }

    /// Capture the tile at the current offset and advance past it.
    ///
    /// Returns `None` once the offset has reached the page height.
    pub fn capture_next<D: PageDriver>(&mut self, driver: &mut D) -> Result<Option<Tile>> {
        if self.is_done() {
            return Ok(None);
        }
        let top = self.offset;
        let part = self.captured + 1;

        driver
            .scroll_to(top)
            .map_err(|e| Error::CaptureError(format!("scroll to y={} for part {} failed: {}", top, part, e)))?;
        settle(self.scroll_settle);

        info!("Capturing part {} (y: {})", part, top);
        let png = driver
            .capture_viewport()
            .map_err(|e| Error::CaptureError(format!("screenshot of part {} at y={} failed: {}", part, top, e)))?;
        debug!("Part {} is {} bytes", part, png.len());

        self.captured += 1;
        self.offset = top.saturating_add(self.tile_height);
        Ok(Some(Tile { png, top }))
    }
}

/// Capture tiles from the top of the page down until it is covered.
///
/// The session visits exactly the offsets of `plan`. The first failing
/// scroll or capture aborts the run; nothing captured so far is returned.
pub fn capture_tiles<D: PageDriver>(driver: &mut D, plan: &CapturePlan, config: &CaptureConfig) -> Result<Vec<Tile>> {
    let mut session = CaptureSession::new(plan, config);
    let mut tiles = Vec::with_capacity(plan.tile_count());

    info!(
        "Capturing {} tiles of {}px for a {}px page",
        plan.tile_count(),
        session.tile_height,
        session.page_height
    );

    while let Some(tile) = session.capture_next(driver)? {
        tiles.push(tile);
    }

    Ok(tiles)
}
