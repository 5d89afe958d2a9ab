//! Scroll geometry: which offsets to capture for a page of a given height

use std::ops::Range;

use crate::{Error, Result};

/// Scroll offsets for one capture run
///
/// Offsets start at 0 and advance by exactly one tile height while they are
/// still inside the page. The last tile may reach past the bottom of the
/// page; the compositor clips it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePlan {
    page_height: u32,
    tile_height: u32,
    offsets: Vec<u32>,
}

impl CapturePlan {
    pub fn page_height(&self) -> u32 {
        self.page_height
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub fn tile_count(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Vertical span each tile covers on the page, in capture order.
    ///
    /// Spans are not clamped to the page height.
    pub fn spans(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        let t = u64::from(self.tile_height);
        self.offsets.iter().map(move |&o| u64::from(o)..u64::from(o) + t)
    }
}

/// Number of tiles needed to cover `page_height` with tiles of `tile_height`.
pub fn tile_count(page_height: u32, tile_height: u32) -> u32 {
    if tile_height == 0 {
        return 0;
    }
    page_height.div_ceil(tile_height)
}

/// Plan the capture of a page `total_height` pixels tall.
///
/// A height of zero or less yields an empty plan. Heights beyond `u32::MAX`
/// are rejected, as is a zero tile height.
pub fn plan_tiles(total_height: i64, tile_height: u32) -> Result<CapturePlan> {
    if tile_height == 0 {
        return Err(Error::ConfigError("tile height must be positive".into()));
    }

    let page_height = if total_height <= 0 {
        0
    } else {
        u32::try_from(total_height)
            .map_err(|_| Error::CompositeError(format!("page height {}px is too large to capture", total_height)))?
    };

    let mut offsets = Vec::with_capacity(tile_count(page_height, tile_height) as usize);
    let mut offset: u64 = 0;
    while offset < u64::from(page_height) {
        // offset < page_height <= u32::MAX
        offsets.push(offset as u32);
        offset += u64::from(tile_height);
    }

    Ok(CapturePlan {
        page_height,
        tile_height,
        offsets,
    })
}
