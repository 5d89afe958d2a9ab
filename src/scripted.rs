//! A deterministic in-memory page driver
//!
//! `ScriptedDriver` stands in for a browser in tests and benchmarks. It
//! answers the suppression and height scripts from [`crate::prepare`],
//! renders each viewport capture from a fixed stripe pattern keyed to the
//! absolute page row, and records every call in a shared [`Journal`].
//!
//! Unlike a real browser it does not clamp scrolling at the bottom of the
//! page: a capture at any offset shows the rows starting at that offset.

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::Value;

use crate::prepare::{MEASURE_HEIGHT_SCRIPT, SUPPRESS_FIXED_SCRIPT};
use crate::{Error, PageDriver, Result, Viewport};

/// Height of one stripe of the synthetic page
pub const STRIPE_HEIGHT: u32 = 100;

/// A call made against the driver, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    SetViewport(Viewport),
    Navigate(String),
    SuppressFixed,
    MeasureHeight,
    Evaluate(String),
    ScrollTo(u32),
    Capture,
    Close,
}

/// Shared view of the calls a [`ScriptedDriver`] has received
///
/// Cloned out of the driver before it is moved into the pipeline.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Arc<Mutex<Vec<DriverCall>>>,
}

impl Journal {
    fn record(&self, call: DriverCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn closed(&self) -> bool {
        self.calls().contains(&DriverCall::Close)
    }

    /// Offsets scrolled to, in order
    pub fn scrolls(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DriverCall::ScrollTo(y) => Some(y),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
enum NavigationFailure {
    Timeout,
    Unreachable(String),
}

pub struct ScriptedDriver {
    page_height: i64,
    height_value: Option<Value>,
    fixed_elements: u64,
    viewport: Viewport,
    frame_height: Option<u32>,
    scroll_y: u32,
    captures: usize,
    navigation_failure: Option<NavigationFailure>,
    capture_failure_at: Option<usize>,
    close_fails: bool,
    journal: Journal,
}

impl ScriptedDriver {
    /// A page that reports `page_height` as its scroll height.
    pub fn new(page_height: i64) -> Self {
        Self {
            page_height,
            height_value: None,
            fixed_elements: 0,
            viewport: Viewport::default(),
            frame_height: None,
            scroll_y: 0,
            captures: 0,
            navigation_failure: None,
            capture_failure_at: None,
            close_fails: false,
            journal: Journal::default(),
        }
    }

    /// Report this many fixed/sticky elements as hidden.
    pub fn with_fixed_elements(mut self, count: u64) -> Self {
        self.fixed_elements = count;
        self
    }

    /// Answer the height script with an arbitrary value instead of the page height.
    pub fn with_height_value(mut self, value: Value) -> Self {
        self.height_value = Some(value);
        self
    }

    /// Render captures `height` rows tall whatever the viewport says, the
    /// way a browser does when only its window was resized.
    pub fn with_frame_height(mut self, height: u32) -> Self {
        self.frame_height = Some(height);
        self
    }

    /// Make navigation run out of time.
    pub fn fail_navigation_with_timeout(mut self) -> Self {
        self.navigation_failure = Some(NavigationFailure::Timeout);
        self
    }

    /// Make navigation fail with `reason`.
    pub fn fail_navigation(mut self, reason: &str) -> Self {
        self.navigation_failure = Some(NavigationFailure::Unreachable(reason.to_string()));
        self
    }

    /// Make the capture with zero-based `index` fail.
    pub fn fail_capture_at(mut self, index: usize) -> Self {
        self.capture_failure_at = Some(index);
        self
    }

    /// Make `close` report an error.
    pub fn fail_close(mut self) -> Self {
        self.close_fails = true;
        self
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    /// Color of the synthetic page at absolute row `y`.
    pub fn shade_at(y: u32) -> Rgba<u8> {
        let stripe = y / STRIPE_HEIGHT;
        Rgba([
            (stripe.wrapping_mul(37) % 256) as u8,
            (stripe.wrapping_mul(91).wrapping_add(17) % 256) as u8,
            (stripe.wrapping_mul(53).wrapping_add(101) % 256) as u8,
            255,
        ])
    }

    fn render_viewport(&self) -> Result<Vec<u8>> {
        let top = self.scroll_y;
        let height = self.frame_height.unwrap_or(self.viewport.height);
        let frame = RgbaImage::from_fn(self.viewport.width, height, |_, row| {
            Self::shade_at(top.saturating_add(row))
        });
        let mut out = Cursor::new(Vec::new());
        frame
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| Error::CaptureError(format!("failed to encode viewport: {}", e)))?;
        Ok(out.into_inner())
    }
}

impl PageDriver for ScriptedDriver {
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.journal.record(DriverCall::SetViewport(viewport));
        self.viewport = viewport;
        Ok(())
    }

    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        self.journal.record(DriverCall::Navigate(url.to_string()));
        match &self.navigation_failure {
            None => Ok(()),
            Some(NavigationFailure::Timeout) => Err(Error::Timeout(timeout.as_millis() as u64)),
            Some(NavigationFailure::Unreachable(reason)) => {
                Err(Error::LoadError(format!("Navigation failed: {}", reason)))
            }
        }
    }

    fn evaluate(&mut self, script: &str) -> Result<Value> {
        if script == SUPPRESS_FIXED_SCRIPT {
            self.journal.record(DriverCall::SuppressFixed);
            return Ok(Value::from(self.fixed_elements));
        }
        if script == MEASURE_HEIGHT_SCRIPT {
            self.journal.record(DriverCall::MeasureHeight);
            return Ok(self
                .height_value
                .clone()
                .unwrap_or_else(|| Value::from(self.page_height)));
        }
        self.journal.record(DriverCall::Evaluate(script.to_string()));
        Ok(Value::Null)
    }

    fn scroll_to(&mut self, y: u32) -> Result<()> {
        self.journal.record(DriverCall::ScrollTo(y));
        self.scroll_y = y;
        Ok(())
    }

    fn capture_viewport(&mut self) -> Result<Vec<u8>> {
        self.journal.record(DriverCall::Capture);
        let index = self.captures;
        self.captures += 1;
        if self.capture_failure_at == Some(index) {
            return Err(Error::CaptureError(format!("scripted failure on capture {}", index)));
        }
        self.render_viewport()
    }

    fn close(self) -> Result<()> {
        self.journal.record(DriverCall::Close);
        if self.close_fails {
            return Err(Error::Other("scripted close failure".into()));
        }
        Ok(())
    }
}
