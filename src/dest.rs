//! Destination resolution and the final move
//!
//! A resolved timestamp maps to `<dest_dir>/<formatted pattern>`; a file
//! whose metadata could not be read keeps its original name under
//! `<source_dir>/failed/`. An already-occupied destination is a hard
//! collision: the source is left in place, never overwritten.

use crate::config::Config;
use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a file should end up, minus its extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationDecision {
    /// Target path without the extension
    pub base: PathBuf,
    /// True when the file is being routed to the failed directory
    pub failed: bool,
}

impl DestinationDecision {
    /// The full target path: base with the extension appended textually
    /// (the extension carries its own leading dot)
    pub fn target(&self, extension: &str) -> PathBuf {
        let mut os = self.base.clone().into_os_string();
        os.push(extension);
        PathBuf::from(os)
    }
}

/// Computes destination paths for processed files
#[derive(Debug)]
pub struct DestinationResolver {
    dest_dir: PathBuf,
    failed_dir: PathBuf,
    pattern: String,
}

impl DestinationResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            dest_dir: config.dest_dir.clone(),
            failed_dir: config.failed_dir(),
            pattern: config.file_pattern.clone(),
        }
    }

    /// Resolve the destination for a source file given its capture
    /// timestamp, or the failed destination when there is none
    pub fn resolve(
        &self,
        source: &Path,
        timestamp: Option<NaiveDateTime>,
    ) -> Result<DestinationDecision> {
        match timestamp {
            Some(ts) => {
                let mut name = String::new();
                write!(name, "{}", ts.format(&self.pattern))
                    .map_err(|_| Error::NamingPattern(self.pattern.clone()))?;
                Ok(DestinationDecision {
                    base: self.dest_dir.join(name),
                    failed: false,
                })
            }
            None => {
                let name = source
                    .file_name()
                    .ok_or_else(|| Error::Io(std::io::Error::other("source has no file name")))?;
                Ok(DestinationDecision {
                    base: self.failed_dir.join(name),
                    failed: true,
                })
            }
        }
    }

    /// Fail when the destination already holds a file with the same
    /// extension. No uniquification is attempted.
    pub fn check_collision(
        &self,
        source: &Path,
        decision: &DestinationDecision,
        extension: &str,
    ) -> Result<()> {
        let target = decision.target(extension);
        if target.is_file() {
            return Err(Error::DestinationExists {
                source_path: source.to_path_buf(),
                destination: target,
            });
        }
        Ok(())
    }
}

/// Create intermediate directories and perform the final rename
pub fn move_into_place(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(source, target)?;
    debug!(from = %source.display(), to = %target.display(), "Moved file");
    Ok(())
}
