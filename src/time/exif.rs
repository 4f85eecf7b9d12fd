//! EXIF capture-time extraction for images

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// Extract the capture time (DateTimeOriginal) from EXIF metadata
pub fn extract_exif_time(path: &Path) -> Result<NaiveDateTime> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| Error::ExifRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .ok_or_else(|| Error::ExifRead {
            path: path.to_path_buf(),
            message: "No DateTimeOriginal tag in EXIF data".to_string(),
        })?;

    let raw = field.display_value().to_string();
    trace!(?path, raw, "Found EXIF capture date");

    parse_exif_datetime(&raw).ok_or_else(|| Error::ExifRead {
        path: path.to_path_buf(),
        message: format!("Malformed EXIF date '{raw}'"),
    })
}

/// Parse an EXIF datetime string
///
/// The raw tag value uses colon-separated dates ("2020:01:02 03:04:05");
/// the display form of an already-parsed tag uses dashes.
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');

    for format in [
        "%Y:%m:%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y:%m:%d %H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    None
}

/// Minimal JPEG holding only an EXIF APP1 segment with a
/// DateTimeOriginal tag, for tests that need a real capture date
#[cfg(test)]
pub(crate) fn jpeg_with_date_time_original(date: &str) -> Vec<u8> {
    assert_eq!(date.len(), 19, "EXIF dates are 'YYYY:MM:DD HH:MM:SS'");

    // Little-endian TIFF: IFD0 at offset 8 holds one entry pointing at
    // the Exif IFD (offset 26), which holds DateTimeOriginal as a
    // 20-byte ASCII value stored at offset 44.
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II\x2a\x00\x08\x00\x00\x00");
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769u16.to_le_bytes()); // Exif IFD pointer
    tiff.extend_from_slice(&4u16.to_le_bytes()); // LONG
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&26u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x9003u16.to_le_bytes()); // DateTimeOriginal
    tiff.extend_from_slice(&2u16.to_le_bytes()); // ASCII
    tiff.extend_from_slice(&20u32.to_le_bytes());
    tiff.extend_from_slice(&44u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(date.as_bytes());
    tiff.push(0);

    let mut jpeg = vec![0xff, 0xd8, 0xff, 0xe1];
    jpeg.extend_from_slice(&((tiff.len() + 8) as u16).to_be_bytes());
    jpeg.extend_from_slice(b"Exif\x00\x00");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xff, 0xd9]);
    jpeg
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::io::Write;

    #[test]
    fn extracts_capture_time_from_jpeg_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0001.jpg");
        std::fs::write(&path, jpeg_with_date_time_original("2020:01:02 03:04:05")).unwrap();

        let dt = extract_exif_time(&path).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2020, 1, 2));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (3, 4, 5));
    }

    #[test]
    fn parses_colon_separated_exif_dates() {
        let dt = parse_exif_datetime("2020:01:02 03:04:05").unwrap();
        assert_eq!(dt.year(), 2020);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 2);
        assert_eq!(dt.hour(), 3);
        assert_eq!(dt.minute(), 4);
        assert_eq!(dt.second(), 5);
    }

    #[test]
    fn parses_display_form_and_quoted_values() {
        assert!(parse_exif_datetime("2020-01-02 03:04:05").is_some());
        assert!(parse_exif_datetime("\"2020:01:02 03:04:05\"").is_some());
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_exif_datetime("not a date").is_none());
        assert!(parse_exif_datetime("2020:13:45 99:99:99").is_none());
    }

    #[test]
    fn unreadable_file_is_an_exif_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_image.jpg");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"definitely not a jpeg").unwrap();

        match extract_exif_time(&path) {
            Err(Error::ExifRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected ExifRead error, got {other:?}"),
        }
    }
}
