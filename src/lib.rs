//! Scrollshot
//!
//! Full-length web page screenshots for pages taller than the viewport. The
//! page is loaded in a fixed-size viewport, fixed and sticky elements are
//! hidden so they do not repeat, and the document is scrolled one viewport at
//! a time. Each viewport capture becomes a tile, and the tiles are stitched
//! onto a single canvas as tall as the page.
//!
//! # Pipeline
//!
//! - [`prepare`]: viewport, navigation, network idle, fixed/sticky suppression,
//!   height measurement
//! - [`plan`]: scroll offsets and tile count for the measured height
//! - [`capture`]: scroll, settle and capture one tile per offset
//! - [`rendering`]: composite the tiles onto a canvas and encode a PNG
//!
//! The browser is reached through the [`PageDriver`] trait. The CDP backend
//! (default feature `cdp`) drives headless Chrome; [`scripted::ScriptedDriver`]
//! renders a synthetic page and needs no browser.
//!
//! # Example
//!
//! ```no_run
//! use scrollshot::{CaptureConfig, cdp::CdpDriver};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CaptureConfig::default();
//! let driver = CdpDriver::launch(&config)?;
//! let shot = scrollshot::capture_full_page(driver, "https://example.com/", &config)?;
//! std::fs::write("index.png", &shot.png_data)?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use log::{info, warn};

pub mod error;
pub use error::{Error, Result};

pub mod capture;
pub mod output;
pub mod plan;
pub mod prepare;
pub mod rendering;
pub mod scripted;

#[cfg(feature = "cdp")]
pub mod cdp;

// Async-friendly wrapper that runs a capture on a worker thread
pub mod async_api;

pub use capture::Tile;
pub use plan::CapturePlan;
pub use rendering::Screenshot;

/// Width of the capture viewport, and of the final image, in pixels
pub const VIEWPORT_WIDTH: u32 = 1280;
/// Height of the capture viewport in pixels. Also the scroll step and tile height.
pub const VIEWPORT_HEIGHT: u32 = 800;
/// Pause after each scroll before the tile is captured
pub const SCROLL_SETTLE_MS: u64 = 500;
/// Pause after the page reaches network idle, for fonts and images to paint
pub const LOAD_SETTLE_MS: u64 = 2000;
/// Pause after hiding fixed/sticky elements, before measuring the page
pub const SUPPRESS_SETTLE_MS: u64 = 500;
/// Upper bound for navigation plus network idle
pub const NAVIGATION_TIMEOUT_MS: u64 = 60000;
/// How long the network must stay quiet to count as idle
pub const NETWORK_IDLE_MS: u64 = 500;

/// Configuration for a capture run
///
/// The defaults are the named constants above. They are not exposed on the
/// command line; library callers (and tests) override individual fields with
/// struct update syntax.
///
/// ```
/// let cfg = scrollshot::CaptureConfig::default();
/// assert_eq!(cfg.viewport.height, scrollshot::VIEWPORT_HEIGHT);
/// ```
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Viewport dimensions; the height doubles as the tile height
    pub viewport: Viewport,
    /// Settle delay after each scroll, in milliseconds
    pub scroll_settle_ms: u64,
    /// Settle delay after the page has loaded, in milliseconds
    pub load_settle_ms: u64,
    /// Settle delay after fixed/sticky suppression, in milliseconds
    pub suppress_settle_ms: u64,
    /// Navigation timeout in milliseconds
    pub timeout_ms: u64,
    /// Quiet period that counts as network idle, in milliseconds
    pub network_idle_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            scroll_settle_ms: SCROLL_SETTLE_MS,
            load_settle_ms: LOAD_SETTLE_MS,
            suppress_settle_ms: SUPPRESS_SETTLE_MS,
            timeout_ms: NAVIGATION_TIMEOUT_MS,
            network_idle_ms: NETWORK_IDLE_MS,
        }
    }
}

impl CaptureConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::ConfigError(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.timeout_ms == 0 {
            return Err(Error::ConfigError("navigation timeout must be positive".into()));
        }
        Ok(())
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn load_settle(&self) -> Duration {
        Duration::from_millis(self.load_settle_ms)
    }

    pub fn suppress_settle(&self) -> Duration {
        Duration::from_millis(self.suppress_settle_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
        }
    }
}

/// Capabilities the pipeline needs from a live page
///
/// Every method acts on the single page owned by the driver. Calls are made
/// strictly one at a time; each observes the effect of the previous one.
pub trait PageDriver {
    /// Resize the visible viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Navigate to `url` and block until the network is idle, or fail once
    /// `timeout` has elapsed
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Evaluate a script in the page's global context and return its value
    ///
    /// Returns `Value::Null` when the script produced no value.
    fn evaluate(&mut self, script: &str) -> Result<serde_json::Value>;

    /// Scroll the document to the absolute vertical offset `y`
    fn scroll_to(&mut self, y: u32) -> Result<()> {
        self.evaluate(&format!("window.scrollTo(0, {})", y))
            .map(|_| ())
    }

    /// Capture the visible viewport (not the full page) as PNG bytes
    fn capture_viewport(&mut self) -> Result<Vec<u8>>;

    /// Shut the page and its browser down
    fn close(self) -> Result<()>;
}

/// Capture a full-length screenshot of `url`.
///
/// Runs the whole pipeline against `driver` and releases it afterwards, on
/// success and on every error path. A failure to close after a successful
/// capture is logged and the screenshot is still returned.
pub fn capture_full_page<D: PageDriver>(
    mut driver: D,
    url: &str,
    config: &CaptureConfig,
) -> Result<Screenshot> {
    let outcome = run_pipeline(&mut driver, url, config);
    let released = driver.close();

    match (outcome, released) {
        (Ok(shot), Ok(())) => Ok(shot),
        (Ok(shot), Err(e)) => {
            warn!("Browser did not shut down cleanly: {}", e);
            Ok(shot)
        }
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!("Browser did not shut down cleanly after failure: {}", close_err);
            Err(e)
        }
    }
}

fn run_pipeline<D: PageDriver>(driver: &mut D, url: &str, config: &CaptureConfig) -> Result<Screenshot> {
    config.validate()?;

    let page = prepare::prepare_page(driver, url, config)?;
    info!("Page height: {}px", page.page_height);

    let plan = plan::plan_tiles(page.page_height, config.viewport.height)?;
    if plan.is_empty() {
        return Err(Error::EmptyPage(page.page_height));
    }
    rendering::raster::ensure_canvas_fits(config.viewport.width, plan.page_height())?;

    let tiles = capture::capture_tiles(driver, &plan, config)?;

    info!("Stitching {} tiles", tiles.len());
    rendering::composite::compose(&tiles, config.viewport.width, plan.page_height(), plan.tile_height())
}
