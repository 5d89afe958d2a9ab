//! Page preparation: viewport, load, fixed/sticky suppression and measurement

use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::{CaptureConfig, Error, PageDriver, Result};

/// Hides every element whose computed position is `fixed` or `sticky`.
///
/// `visibility` keeps the element in layout flow, so the page height and
/// everything below the element are unaffected. `!important` on the inline
/// style beats authored rules. Evaluates to the number of hidden elements.
pub const SUPPRESS_FIXED_SCRIPT: &str = r#"(function() {
    let hidden = 0;
    for (const el of document.querySelectorAll('*')) {
        const position = window.getComputedStyle(el).position;
        if (position === 'fixed' || position === 'sticky') {
            el.style.setProperty('visibility', 'hidden', 'important');
            hidden++;
        }
    }
    return hidden;
})()"#;

/// Evaluates to the full scrollable height of the document.
pub const MEASURE_HEIGHT_SCRIPT: &str = "document.documentElement.scrollHeight";

/// A loaded page ready for capture
#[derive(Debug, Clone)]
pub struct PreparedPage {
    /// URL the page was loaded from
    pub url: String,
    /// Scrollable height measured after suppression
    pub page_height: i64,
    /// Number of fixed/sticky elements that were hidden
    pub hidden_elements: u64,
}

/// Load `url` into the driver's page and get it ready for capture.
pub fn prepare_page<D: PageDriver>(driver: &mut D, url: &str, config: &CaptureConfig) -> Result<PreparedPage> {
    if url.trim().is_empty() {
        return Err(Error::UsageError("target URL is empty".into()));
    }

    driver.set_viewport(config.viewport)?;

    info!("Loading {}", url);
    driver.navigate(url, config.timeout())?;
    settle(config.load_settle());

    info!("Hiding fixed and sticky elements");
    let hidden_elements = suppress_fixed_elements(driver)?;
    debug!("Hid {} fixed/sticky elements", hidden_elements);
    settle(config.suppress_settle());

    let page_height = measure_page_height(driver)?;

    Ok(PreparedPage {
        url: url.to_string(),
        page_height,
        hidden_elements,
    })
}

/// Hide fixed/sticky elements on the live page. Returns how many were hidden.
pub fn suppress_fixed_elements<D: PageDriver>(driver: &mut D) -> Result<u64> {
    let value = driver.evaluate(SUPPRESS_FIXED_SCRIPT)?;
    value
        .as_u64()
        .ok_or_else(|| Error::ScriptError(format!("suppression returned a non-count value: {}", value)))
}

/// Measure the scrollable height of the document in whole pixels.
pub fn measure_page_height<D: PageDriver>(driver: &mut D) -> Result<i64> {
    let value = driver.evaluate(MEASURE_HEIGHT_SCRIPT)?;
    if let Some(h) = value.as_i64() {
        return Ok(h);
    }
    match value.as_f64() {
        Some(h) if h.is_finite() => Ok(h.ceil() as i64),
        _ => Err(Error::ScriptError(format!("page height is not a number: {}", value))),
    }
}

pub(crate) fn settle(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
