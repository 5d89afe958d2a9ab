//! Chrome DevTools Protocol page driver

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::{Emulation, Page};
use headless_chrome::{Browser, LaunchOptions};
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::{CaptureConfig, Error, PageDriver, Result, Viewport};

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

// Completed resource entries only move when a request finishes, so a count
// that holds still for the idle window approximates "no network activity".
const NETWORK_PROBE_SCRIPT: &str = r#"JSON.stringify({
    complete: document.readyState === 'complete',
    resources: performance.getEntriesByType('resource').length
})"#;

#[derive(Debug, Deserialize)]
struct NetworkProbe {
    complete: bool,
    resources: u64,
}

/// Headless Chrome page driver (uses the `headless_chrome` crate)
///
/// Launches a headless Chrome instance and drives a single tab. The browser
/// process is shut down by [`PageDriver::close`], or when the driver is
/// dropped on an unwinding path.
pub struct CdpDriver {
    browser: Browser,
    tab: Arc<Tab>,
    network_idle: Duration,
}

impl CdpDriver {
    /// Launch headless Chrome with a window matching the configured viewport.
    pub fn launch(config: &CaptureConfig) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;

        Ok(Self {
            browser,
            tab,
            network_idle: Duration::from_millis(config.network_idle_ms),
        })
    }

    fn probe_network(&self) -> Result<NetworkProbe> {
        let raw = self
            .tab
            .evaluate(NETWORK_PROBE_SCRIPT, false)
            .map_err(|e| Error::LoadError(format!("Network probe failed: {}", e)))?
            .value
            .unwrap_or(Value::Null);

        let text = raw
            .as_str()
            .ok_or_else(|| Error::LoadError(format!("Network probe returned {}", raw)))?;
        serde_json::from_str(text).map_err(|e| Error::LoadError(format!("Malformed network probe: {}", e)))
    }

    fn wait_for_network_idle(&self, deadline: Instant, timeout: Duration) -> Result<()> {
        let mut last_count: Option<u64> = None;
        let mut quiet_since = Instant::now();

        loop {
            let probe = self.probe_network()?;
            let now = Instant::now();

            if !probe.complete || last_count != Some(probe.resources) {
                last_count = Some(probe.resources);
                quiet_since = now;
            } else if now.duration_since(quiet_since) >= self.network_idle {
                debug!("Network idle after {} resources", probe.resources);
                return Ok(());
            }

            if now >= deadline {
                return Err(Error::Timeout(timeout.as_millis() as u64));
            }
            thread::sleep(IDLE_POLL_INTERVAL);
        }
    }
}

impl PageDriver for CdpDriver {
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        // Emulated metrics pin the layout viewport, and so every screenshot,
        // to exactly width x height CSS pixels at scale 1, whatever size the
        // browser window ends up with.
        self.tab
            .call_method(Emulation::SetDeviceMetricsOverride {
                width: viewport.width,
                height: viewport.height,
                device_scale_factor: 1.0,
                mobile: false,
                scale: None,
                screen_width: None,
                screen_height: None,
                position_x: None,
                position_y: None,
                dont_set_visible_size: None,
                screen_orientation: None,
                viewport: None,
                display_feature: None,
                device_posture: None,
            })
            .map_err(|e| Error::InitializationError(format!("Failed to set viewport: {}", e)))?;
        Ok(())
    }

    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        self.tab.set_default_timeout(timeout);

        self.tab
            .navigate_to(url)
            .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

        self.wait_for_network_idle(deadline, timeout)
    }

    fn evaluate(&mut self, script: &str) -> Result<Value> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| Error::ScriptError(format!("Evaluation failed: {}", e)))?;

        Ok(result.value.unwrap_or(Value::Null))
    }

    fn capture_viewport(&mut self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| Error::CaptureError(format!("Screenshot failed: {}", e)))
    }

    fn close(self) -> Result<()> {
        // Dropping the browser terminates the child process.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}
