//! Legacy-container normalization
//!
//! Remuxes mov/3gp arrivals into the canonical container by copying the
//! audio and video streams plus metadata, with no re-encoding. The
//! transcoder writes to a temporary file next to the source (same
//! filesystem) which is promoted by rename only on success; the original
//! is removed afterwards. The promoted file lands in the watched
//! directory and re-enters the pipeline through a fresh event.

use crate::error::Result;
use crate::external::{self, TRANSCODER};
use crate::media::CANONICAL_VIDEO_EXTENSION;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Remux a legacy-container video into the canonical container beside
/// the source, removing the source on success
pub fn remux_to_canonical(source: &Path) -> Result<PathBuf> {
    let converted = source.with_extension(CANONICAL_VIDEO_EXTENSION);
    let dir = source.parent().unwrap_or_else(|| Path::new("."));

    // Hidden temp name so the close-write event for it never matches a
    // media extension; dropped (and deleted) unless promoted below
    let temp = tempfile::Builder::new()
        .prefix(".remux-")
        .suffix(&format!(".{CANONICAL_VIDEO_EXTENSION}.part"))
        .tempfile_in(dir)?
        .into_temp_path();

    // a failure propagates with the captured stderr; the source stays put
    external::run(
        TRANSCODER,
        [
            OsStr::new("-i"),
            source.as_os_str(),
            OsStr::new("-vcodec"),
            OsStr::new("copy"),
            OsStr::new("-acodec"),
            OsStr::new("copy"),
            OsStr::new("-map_metadata"),
            OsStr::new("0"),
            OsStr::new("-y"),
            temp.as_os_str(),
        ],
    )?
    .assert_success()?;

    temp.persist(&converted).map_err(|e| e.error)?;
    fs::remove_file(source)?;
    info!(
        from = %source.display(),
        to = %converted.display(),
        "Converted legacy container"
    );

    Ok(converted)
}
