//! Capture-time resolution
//!
//! Timestamps come from EXIF metadata for images and from the metadata
//! prober for canonical-container videos. Resolution never fails the
//! caller: any error is logged as a warning and the file is routed to
//! the failed destination downstream.

pub mod exif;
pub mod video;

use crate::media::MediaKind;
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::{debug, warn};

/// Resolve the capture timestamp of a file, or `None` when its metadata
/// cannot be read
pub fn resolve_timestamp(path: &Path, kind: MediaKind) -> Option<NaiveDateTime> {
    match kind {
        // Unknown files get the same EXIF attempt as images; formats
        // without EXIF fail resolution and land in the failed directory
        MediaKind::Image | MediaKind::Unknown => match exif::extract_exif_time(path) {
            Ok(timestamp) => Some(timestamp),
            Err(e) => {
                warn!(source = %path.display(), "{e}");
                None
            }
        },
        MediaKind::CanonicalVideo => match video::extract_video_time(path) {
            Ok(timestamp) => Some(timestamp),
            Err(e) => {
                warn!(source = %path.display(), "{e}");
                None
            }
        },
        // Legacy containers are remuxed before any naming happens
        MediaKind::LegacyVideo => {
            debug!(source = %path.display(), "No timestamp resolution for legacy container");
            None
        }
    }
}
