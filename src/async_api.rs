//! Async entry point for callers running inside a tokio runtime
//!
//! The capture pipeline is blocking (settle delays, synchronous CDP calls),
//! so it runs on a dedicated worker thread that owns the driver from launch
//! to close. The result comes back over a oneshot channel.

use std::thread;

use tokio::sync::oneshot;

use crate::{CaptureConfig, Error, PageDriver, Result, Screenshot};

/// Launch a driver on a worker thread and capture `url` with it.
///
/// `launch` runs on the worker thread, so the driver never has to be `Send`.
pub async fn capture_page<D, F>(launch: F, url: String, config: CaptureConfig) -> Result<Screenshot>
where
    D: PageDriver + 'static,
    F: FnOnce(&CaptureConfig) -> Result<D> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    thread::Builder::new()
        .name("scrollshot-capture".into())
        .spawn(move || {
            let res = launch(&config).and_then(|driver| crate::capture_full_page(driver, &url, &config));
            let _ = tx.send(res);
        })
        .map_err(|e| Error::Other(format!("Failed to spawn capture worker: {}", e)))?;

    rx.await
        .map_err(|e| Error::Other(format!("Capture worker canceled: {}", e)))?
}

/// Capture `url` with headless Chrome without blocking the async runtime.
#[cfg(feature = "cdp")]
pub async fn capture_page_cdp(url: &str, config: Option<CaptureConfig>) -> Result<Screenshot> {
    let config = config.unwrap_or_default();
    capture_page(crate::cdp::CdpDriver::launch, url.to_string(), config).await
}
