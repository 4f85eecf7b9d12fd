//! Downscaled preview generation
//!
//! Emits a small companion video alongside a successfully renamed one.
//! Best effort: a failure is logged by the caller and never affects the
//! primary move.

use crate::error::{Error, Result};
use crate::external::{self, TRANSCODER};
use crate::media::extension_of;
use crate::time::video::VideoInfo;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Longer display dimension of the generated preview, in pixels
const PREVIEW_EDGE: u32 = 320;

/// Generate a downscaled preview next to a video already placed in the
/// destination tree
pub fn generate_preview(video: &Path) -> Result<PathBuf> {
    let info = VideoInfo::probe(video)?;
    let (width, height) = info.display_size().ok_or_else(|| Error::VideoMetadata {
        path: video.to_path_buf(),
        message: "No video dimensions in metadata".to_string(),
    })?;

    let scale = scale_expression(width, height);
    let target = preview_path(video);
    debug!(video = %video.display(), scale, "Creating low res version");

    // a failure propagates with the captured stderr; the caller warns once
    external::run(
        TRANSCODER,
        [
            OsStr::new("-y"),
            OsStr::new("-i"),
            video.as_os_str(),
            OsStr::new("-map_metadata"),
            OsStr::new("0"),
            OsStr::new("-vf"),
            OsStr::new(&scale),
            target.as_os_str(),
        ],
    )?
    .assert_success()?;

    Ok(target)
}

/// Fix the longer display dimension to the preview edge; the transcoder
/// computes the other one, rounded to an even pixel count (-2)
fn scale_expression(display_width: u32, display_height: u32) -> String {
    if display_width < display_height {
        format!("scale={PREVIEW_EDGE}:-2")
    } else {
        format!("scale=-2:{PREVIEW_EDGE}")
    }
}

/// The preview lives beside the full-resolution file, distinguished by
/// an underscore before the extension: `clip.mp4` -> `clip_.mp4`
fn preview_path(video: &Path) -> PathBuf {
    let extension = extension_of(video);
    let mut os = video.with_extension("").into_os_string();
    os.push("_");
    os.push(&extension);
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_fixes_height() {
        assert_eq!(scale_expression(1920, 1080), "scale=-2:320");
    }

    #[test]
    fn portrait_fixes_width() {
        assert_eq!(scale_expression(1080, 1920), "scale=320:-2");
    }

    #[test]
    fn square_is_treated_as_landscape() {
        assert_eq!(scale_expression(640, 640), "scale=-2:320");
    }

    #[test]
    fn preview_sits_beside_the_original() {
        assert_eq!(
            preview_path(Path::new("/dest/2020/01-02_030405.mp4")),
            PathBuf::from("/dest/2020/01-02_030405_.mp4")
        );
    }
}
