//! Video metadata extraction via the mediainfo prober
//!
//! Dates in video containers are stored in UTC; values carrying a UTC
//! marker are converted to local time so destination names line up with
//! the wall clock at capture time.

use crate::error::{Error, Result};
use crate::external::{self, PROBER};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, trace};

/// Metadata fields to try for the capture date, in priority order
const CAPTURE_DATE_FIELDS: &[&str] = &["Recorded_Date", "Encoded_Date"];

/// Parsed mediainfo JSON output for a single file
///
/// Derived per invocation and discarded after use; never cached.
#[derive(Debug)]
pub struct VideoInfo {
    json: Value,
}

impl VideoInfo {
    /// Probe a file with mediainfo and parse its JSON report
    pub fn probe(path: &Path) -> Result<Self> {
        let result = external::run(PROBER, [OsStr::new("--Output=JSON"), path.as_os_str()])?;
        if !result.success() {
            return Err(Error::VideoMetadata {
                path: path.to_path_buf(),
                message: format!("{PROBER} failed: {}", result.stderr_lossy()),
            });
        }

        let json: Value =
            serde_json::from_slice(&result.stdout).map_err(|e| Error::VideoMetadata {
                path: path.to_path_buf(),
                message: format!("Failed to parse {PROBER} JSON: {e}"),
            })?;
        trace!(?path, "mediainfo probe complete");

        Ok(Self::from_value(json))
    }

    fn from_value(json: Value) -> Self {
        Self { json }
    }

    fn track(&self, kind: &str) -> Option<&Value> {
        self.json
            .get("media")?
            .get("track")?
            .as_array()?
            .iter()
            .find(|t| t.get("@type").and_then(|v| v.as_str()) == Some(kind))
    }

    /// A string field from the Video track
    pub fn video(&self, field: &str) -> Option<&str> {
        self.track("Video")?.get(field)?.as_str()
    }

    /// A string field from the General track
    pub fn general(&self, field: &str) -> Option<&str> {
        self.track("General")?.get(field)?.as_str()
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.video(name).or_else(|| self.general(name))
    }

    /// The raw capture date, trying the recorded date before falling
    /// back to the encode date
    pub fn capture_date(&self) -> Option<&str> {
        CAPTURE_DATE_FIELDS.iter().find_map(|f| self.field(f))
    }

    fn numeric(&self, name: &str) -> Option<f64> {
        let value = self.track("Video")?.get(name)?;
        value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
    }

    /// Stored pixel dimensions of the video stream
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        let width = self.numeric("Width")? as u32;
        let height = self.numeric("Height")? as u32;
        Some((width, height))
    }

    /// Rotation of the video stream in degrees, when present
    pub fn rotation(&self) -> Option<u32> {
        self.numeric("Rotation").map(|r| r.round() as u32 % 360)
    }

    /// Dimensions as displayed: a rotation of 90 or 270 degrees swaps
    /// the stored width and height
    pub fn display_size(&self) -> Option<(u32, u32)> {
        let (width, height) = self.dimensions()?;
        match self.rotation() {
            Some(90) | Some(270) => Some((height, width)),
            _ => Some((width, height)),
        }
    }
}

/// Extract the capture time from video metadata
pub fn extract_video_time(path: &Path) -> Result<NaiveDateTime> {
    let info = VideoInfo::probe(path)?;

    let raw = info.capture_date().ok_or_else(|| Error::VideoMetadata {
        path: path.to_path_buf(),
        message: "No recorded or encoded date in video metadata".to_string(),
    })?;

    let (naive, is_utc) = parse_capture_date(raw).ok_or_else(|| Error::VideoMetadata {
        path: path.to_path_buf(),
        message: format!("Malformed capture date '{raw}'"),
    })?;

    let resolved = if is_utc {
        Utc.from_utc_datetime(&naive)
            .with_timezone(&Local)
            .naive_local()
    } else {
        naive
    };
    debug!(?path, raw, %resolved, "Found video capture time");

    Ok(resolved)
}

/// Parse a mediainfo date value into a naive timestamp and whether it
/// was marked as UTC
///
/// mediainfo renders dates either with an explicit marker
/// ("UTC 2020-01-02 03:04:05", "2020-01-02 03:04:05 UTC") or with a
/// numeric offset, depending on its version.
fn parse_capture_date(raw: &str) -> Option<(NaiveDateTime, bool)> {
    let s = raw.trim();

    for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f %z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some((dt.naive_utc(), true));
        }
    }

    let (s, is_utc) = if let Some(rest) = s.strip_prefix("UTC ") {
        (rest, true)
    } else if let Some(rest) = s.strip_suffix(" UTC") {
        (rest, true)
    } else if let Some(rest) = s.strip_suffix('Z') {
        (rest, true)
    } else {
        (s, false)
    };

    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some((dt, is_utc));
        }
    }

    None
}
