//! Event queue consumption and per-file processing
//!
//! A single consumer loop dequeues one path at a time and processes it
//! to completion before touching the next, which is the serialization
//! guarantee the whole system rests on: destination collision checks
//! are evaluated against a destination tree nothing else is mutating,
//! and at most one transcoder run is in flight.

use crate::config::Config;
use crate::convert;
use crate::dest::{self, DestinationResolver};
use crate::error::Result;
use crate::media::{self, MediaKind};
use crate::preview;
use crate::time;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cadence of the queue poll; also how quickly an operator interrupt is
/// noticed between items
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Grace period before touching a just-arrived file, so a writer that
/// closed it a moment ago has fully flushed
const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// The single consumer of the event queue
#[derive(Debug)]
pub struct Sequencer {
    config: Config,
    resolver: DestinationResolver,
    settle_delay: Duration,
}

impl Sequencer {
    pub fn new(config: Config) -> Self {
        let resolver = DestinationResolver::new(&config);
        Self {
            config,
            resolver,
            settle_delay: SETTLE_DELAY,
        }
    }

    #[cfg(test)]
    fn without_settle_delay(mut self) -> Self {
        self.settle_delay = Duration::ZERO;
        self
    }

    /// Consume the queue until the shutdown flag is raised or every
    /// producer is gone. An in-flight item always finishes.
    pub fn run(&self, receiver: Receiver<PathBuf>, shutdown: Arc<AtomicBool>) {
        info!(
            source = %self.config.source_dir.display(),
            "Watching for arriving files"
        );
        run_loop(receiver, shutdown, |path| self.process(path));
    }

    /// Process one dequeued file. All failures are handled here; they
    /// are logged and never escape to the consumer loop.
    pub fn process(&self, source: &Path) {
        thread::sleep(self.settle_delay);
        if let Err(e) = self.process_inner(source) {
            warn!(source = %source.display(), "{e}");
        }
    }

    fn process_inner(&self, source: &Path) -> Result<()> {
        if !source.exists() {
            // e.g. a remux temp file renamed away before its event came up
            debug!(source = %source.display(), "File vanished before processing, skipping");
            return Ok(());
        }

        let kind = MediaKind::from_path(source);
        if kind == MediaKind::LegacyVideo {
            // the converted file re-arrives through a fresh watch event
            convert::remux_to_canonical(source)?;
            return Ok(());
        }

        let timestamp = time::resolve_timestamp(source, kind);
        let decision = self.resolver.resolve(source, timestamp)?;
        let extension = media::extension_of(source);
        // the failed destination keeps the original name, extension included
        let extension = if decision.failed {
            ""
        } else {
            extension.as_str()
        };

        self.resolver.check_collision(source, &decision, extension)?;

        let target = decision.target(extension);
        dest::move_into_place(source, &target)?;
        info!(
            from = %source.display(),
            to = %target.display(),
            "Moved file"
        );

        if kind == MediaKind::CanonicalVideo
            && !decision.failed
            && let Err(e) = preview::generate_preview(&target)
        {
            // best effort; the move above already succeeded
            warn!(video = %target.display(), "{e}");
        }

        Ok(())
    }
}

/// Poll the queue on a fixed cadence, handing each entry to the handler
/// one at a time
fn run_loop<F: FnMut(&Path)>(
    receiver: Receiver<PathBuf>,
    shutdown: Arc<AtomicBool>,
    mut handle: F,
) {
    while !shutdown.load(Ordering::SeqCst) {
        match receiver.recv_timeout(POLL_INTERVAL) {
            Ok(path) => handle(&path),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use std::sync::mpsc;
    use std::time::Instant;

    fn sequencer(source_dir: &Path, dest_dir: &Path) -> Sequencer {
        Sequencer::new(Config {
            source_dir: source_dir.to_path_buf(),
            dest_dir: dest_dir.to_path_buf(),
            ..Config::default()
        })
        .without_settle_delay()
    }

    #[test]
    fn entries_are_processed_one_at_a_time() {
        let (tx, rx) = mpsc::channel();
        let spans = Arc::new(Mutex::new(Vec::new()));

        let producers: Vec<_> = (0..2)
            .map(|p| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for i in 0..5 {
                        tx.send(PathBuf::from(format!("/inbox/file_{p}_{i}"))).unwrap();
                    }
                })
            })
            .collect();
        drop(tx);

        let handler_spans = spans.clone();
        run_loop(rx, Arc::new(AtomicBool::new(false)), |_path| {
            let start = Instant::now();
            thread::sleep(Duration::from_millis(20));
            handler_spans.lock().unwrap().push((start, Instant::now()));
        });
        for producer in producers {
            producer.join().unwrap();
        }

        let spans = spans.lock().unwrap();
        assert_eq!(spans.len(), 10);
        for pair in spans.windows(2) {
            assert!(
                pair[1].0 >= pair[0].1,
                "processing intervals must not overlap"
            );
        }
    }

    #[test]
    fn shutdown_flag_stops_the_loop() {
        let (tx, rx) = mpsc::channel::<PathBuf>();
        let shutdown = Arc::new(AtomicBool::new(true));
        // sender kept alive: only the flag can end this
        run_loop(rx, shutdown, |_| panic!("nothing was queued"));
        drop(tx);
    }

    #[test]
    fn vanished_path_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let sequencer = sequencer(dir.path(), dir.path());
        // must not end up warning or creating anything
        sequencer.process(&dir.path().join("already_gone.jpg"));
        assert!(!dir.path().join("failed").exists());
    }

    #[test]
    fn valid_exif_lands_at_patterned_destination() {
        let inbox = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let source = inbox.path().join("IMG_0001.jpg");
        let image = crate::time::exif::jpeg_with_date_time_original("2020:01:02 03:04:05");
        fs::write(&source, &image).unwrap();

        sequencer(inbox.path(), dest.path()).process(&source);

        // default pattern %Y/%m-%d_%H%M%S
        let target = dest.path().join("2020").join("01-02_030405.jpg");
        assert!(!source.exists());
        assert_eq!(fs::read(&target).unwrap(), image);
        assert!(!inbox.path().join("failed").exists());
    }

    #[test]
    fn unresolvable_file_moves_to_failed_intact() {
        let inbox = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let source = inbox.path().join("noexif.jpg");
        fs::write(&source, b"junk that is not a jpeg").unwrap();

        sequencer(inbox.path(), dest.path()).process(&source);

        let failed = inbox.path().join("failed").join("noexif.jpg");
        assert!(!source.exists());
        assert_eq!(fs::read(&failed).unwrap(), b"junk that is not a jpeg");
        // nothing lands in the destination tree
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn collision_leaves_source_in_place() {
        let inbox = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let source = inbox.path().join("noexif.jpg");
        fs::write(&source, b"new arrival").unwrap();

        let occupied = inbox.path().join("failed").join("noexif.jpg");
        fs::create_dir_all(occupied.parent().unwrap()).unwrap();
        fs::write(&occupied, b"previous failure").unwrap();

        sequencer(inbox.path(), dest.path()).process(&source);

        assert_eq!(fs::read(&source).unwrap(), b"new arrival");
        assert_eq!(fs::read(&occupied).unwrap(), b"previous failure");
    }
}
