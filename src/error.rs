//! Error types for the capture pipeline

use thiserror::Error;

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing, capturing or stitching a page
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed command-line input
    #[error("Usage error: {0}")]
    UsageError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to launch or set up the browser
    #[error("Browser initialization failed: {0}")]
    InitializationError(String),

    /// Failed to load a URL
    #[error("Failed to load URL: {0}")]
    LoadError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Failed to evaluate a script against the live document
    #[error("Script execution failed: {0}")]
    ScriptError(String),

    /// A scroll or viewport capture step failed
    #[error("Capture failed: {0}")]
    CaptureError(String),

    /// The measured page height leaves nothing to capture
    #[error("Page has no content to capture (measured height {0}px)")]
    EmptyPage(i64),

    /// Failed to assemble tiles onto the canvas
    #[error("Compositing failed: {0}")]
    CompositeError(String),

    /// Failed to encode the finished canvas
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    /// Writing the output file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
