//! Media kind classification
//!
//! Extension sniffing happens exactly once, at the boundary of the
//! processing pipeline; everything downstream dispatches on the variant.

use std::path::Path;

/// Image formats handled by the EXIF reader
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "heic", "heif", "tiff", "tif",
];

/// Containers that are remuxed before any naming happens
const LEGACY_VIDEO_EXTENSIONS: &[&str] = &["mov", "3gp"];

/// The container all processed videos end up in
pub const CANONICAL_VIDEO_EXTENSION: &str = "mp4";

/// Kind of media file, classified from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image; capture time comes from EXIF
    Image,
    /// Video already in the canonical container; capture time comes
    /// from the metadata prober
    CanonicalVideo,
    /// Video in a container that must be remuxed first
    LegacyVideo,
    /// Anything else; still given a chance at EXIF resolution before
    /// being routed to the failed destination
    Unknown,
}

impl MediaKind {
    /// Classify a path by its (case-insensitive) extension
    pub fn from_path(path: &Path) -> Self {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => return MediaKind::Unknown,
        };

        if ext == CANONICAL_VIDEO_EXTENSION {
            MediaKind::CanonicalVideo
        } else if LEGACY_VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::LegacyVideo
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Image
        } else {
            MediaKind::Unknown
        }
    }
}

/// The extension of a path including its leading dot, with the original
/// casing preserved (`"photo.JPG"` -> `".JPG"`). Empty when there is no
/// extension.
pub fn extension_of(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!(".{ext}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn classifies_by_extension() {
        let cases = [
            ("IMG_0001.jpg", MediaKind::Image),
            ("scan.TIFF", MediaKind::Image),
            ("clip.mp4", MediaKind::CanonicalVideo),
            ("clip.MP4", MediaKind::CanonicalVideo),
            ("clip.mov", MediaKind::LegacyVideo),
            ("clip.3gp", MediaKind::LegacyVideo),
            ("notes.txt", MediaKind::Unknown),
            ("no_extension", MediaKind::Unknown),
        ];
        for (name, expected) in cases {
            assert_eq!(
                MediaKind::from_path(&PathBuf::from(name)),
                expected,
                "{name}"
            );
        }
    }

    #[test]
    fn extension_preserves_case_and_dot() {
        assert_eq!(extension_of(&PathBuf::from("a/b/photo.JPG")), ".JPG");
        assert_eq!(extension_of(&PathBuf::from("clip.mp4")), ".mp4");
        assert_eq!(extension_of(&PathBuf::from("no_extension")), "");
    }
}
