//! Target URL validation, output file naming and writing

use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;
use url::Url;

use crate::{Error, Result};

/// Base name used when the URL path has no usable last segment
pub const DEFAULT_BASENAME: &str = "index";

/// Parse the command-line target into an absolute URL.
///
/// Runs before any browser is launched, so a bad argument costs nothing.
pub fn parse_target_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::UsageError("no URL given".into()));
    }
    let url = Url::parse(raw).map_err(|e| Error::UsageError(format!("'{}' is not a valid URL: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(Error::UsageError(format!("'{}' is not a page URL", raw)));
    }
    Ok(url)
}

/// File name for the screenshot of `url`.
///
/// Last non-empty path segment, final extension removed, `.png` appended:
/// `/blog/post.html` gives `post.png`, `/docs/` gives `docs.png`, and the
/// site root gives `index.png`.
pub fn output_filename(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("");

    let stem = Path::new(segment)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_BASENAME);

    format!("{}.png", stem)
}

/// Write `bytes` to `dir/filename`.
///
/// The data goes to a temporary file in `dir` first and is renamed into
/// place, so a failed write never leaves a partial image behind.
pub fn write_output(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    let target = dir.join(filename);

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(&target).map_err(|e| Error::Io(e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), target.display());
    Ok(target)
}
