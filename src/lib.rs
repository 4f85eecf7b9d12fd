//! Media Mover - inbox watcher for photo and video organization
//!
//! This library provides the pieces of a small ingestion pipeline:
//! - Directory watching for arriving files (inotify close-write/moved-to)
//! - Strictly serialized, one-at-a-time processing of the event queue
//! - Capture-time resolution from EXIF (images) and mediainfo (videos)
//! - Timestamp-patterned destination naming with collision refusal
//! - Legacy container (mov/3gp) remuxing to mp4 via ffmpeg
//! - Downscaled, orientation-aware previews for renamed videos

pub mod cli;
pub mod config;
pub mod convert;
pub mod dest;
pub mod error;
pub mod external;
pub mod media;
pub mod pipeline;
pub mod preview;
pub mod time;
pub mod watch;

pub use cli::Cli;
pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use media::MediaKind;
pub use pipeline::Sequencer;
pub use watch::InboxWatcher;
