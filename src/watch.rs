//! Directory watcher
//!
//! Thin adapter over the notify crate: arriving-file events for the
//! watched directory are forwarded as absolute paths into an unbounded
//! channel, so forwarding never blocks the notification thread and
//! never drops an event. No extension filtering happens here.

use crate::error::Result;
use notify::event::{AccessKind, AccessMode, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::{debug, warn};

/// Watches the inbox directory and feeds the processing queue
///
/// Watching stops when this is dropped.
pub struct InboxWatcher {
    _watcher: RecommendedWatcher,
}

impl InboxWatcher {
    /// Start watching a single directory (non-recursive). Fails when
    /// the directory is inaccessible.
    pub fn start(dir: &Path, sender: Sender<PathBuf>) -> Result<Self> {
        let mut watcher =
            notify::recommended_watcher(move |event: notify::Result<Event>| match event {
                Ok(event) if is_arrival(&event.kind) => {
                    for path in event.paths {
                        debug!(path = %path.display(), "File arrived in watched folder");
                        // receiver only disappears at shutdown
                        let _ = sender.send(path);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Watch error: {e}"),
            })?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok(Self { _watcher: watcher })
    }
}

/// A file finished being written, or was moved into the directory
fn is_arrival(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Access(AccessKind::Close(AccessMode::Write))
            | EventKind::Modify(ModifyKind::Name(RenameMode::To))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn arrival_kinds_are_close_write_and_moved_to() {
        assert!(is_arrival(&EventKind::Access(AccessKind::Close(
            AccessMode::Write
        ))));
        assert!(is_arrival(&EventKind::Modify(ModifyKind::Name(
            RenameMode::To
        ))));

        assert!(!is_arrival(&EventKind::Access(AccessKind::Close(
            AccessMode::Read
        ))));
        assert!(!is_arrival(&EventKind::Modify(ModifyKind::Name(
            RenameMode::From
        ))));
        assert!(!is_arrival(&EventKind::Remove(
            notify::event::RemoveKind::File
        )));
    }

    #[test]
    fn missing_directory_fails_fast() {
        let (tx, _rx) = mpsc::channel();
        assert!(InboxWatcher::start(Path::new("/no/such/directory"), tx).is_err());
    }

    #[test]
    fn written_file_is_queued() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let _watcher = InboxWatcher::start(dir.path(), tx).unwrap();

        let file = dir.path().join("IMG_0001.jpg");
        std::fs::write(&file, b"bytes").unwrap();

        let queued = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("expected a queue entry for the written file");
        assert_eq!(queued, file);
    }
}
