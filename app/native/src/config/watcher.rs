//! Configuration file watcher for hot-reloading.
//!
//! The parent directory is watched rather than the file itself: editors that
//! save through a temporary file and a rename would otherwise detach the
//! watch after the first save.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::utils::thread::spawn_named_thread;

/// Events closer together than this count as one save.
const DEBOUNCE: Duration = Duration::from_millis(200);

/// How often the watcher thread checks whether it should stop.
const STOP_POLL: Duration = Duration::from_millis(250);

/// Collapses bursts of events into one reload.
#[derive(Debug, Default)]
struct Debouncer {
    last: Option<Instant>,
}

impl Debouncer {
    /// Returns true if an event at `now` should trigger a reload.
    fn accept(&mut self, now: Instant) -> bool {
        if self.last.is_some_and(|last| now.duration_since(last) < DEBOUNCE) {
            return false;
        }
        self.last = Some(now);
        true
    }
}

/// Returns true if `event` modified the file called `file_name`.
fn touches_file(event: &Event, file_name: &OsString) -> bool {
    !event.kind.is_access()
        && event.paths.iter().any(|path| path.file_name().is_some_and(|name| name == file_name))
}

/// Starts watching a configuration file for changes.
///
/// Spawns a background thread that calls `on_change` (debounced) each time
/// the file is written, replaced or created. The thread exits once `running`
/// becomes false.
pub fn watch_config_file<F>(config_path: PathBuf, running: Arc<AtomicBool>, on_change: F)
where F: Fn() + Send + 'static {
    let file_name = config_path.file_name().map(OsString::from).unwrap_or_default();

    spawn_named_thread("config-watcher", move || {
        let (tx, rx) = mpsc::channel();

        let mut watcher: RecommendedWatcher = match notify::recommended_watcher(tx) {
            Ok(watcher) => watcher,
            Err(err) => {
                tracing::warn!(error = %err, "failed to create config watcher");
                return;
            }
        };

        let directory = config_path.parent().unwrap_or_else(|| Path::new("."));
        if let Err(err) = watcher.watch(directory, RecursiveMode::NonRecursive) {
            tracing::warn!(error = %err, path = %directory.display(), "failed to watch config directory");
            return;
        }

        tracing::debug!(path = %config_path.display(), "watching configuration file");
        let mut debouncer = Debouncer::default();

        while running.load(Ordering::SeqCst) {
            match rx.recv_timeout(STOP_POLL) {
                Ok(Ok(event)) if touches_file(&event, &file_name) => {
                    if debouncer.accept(Instant::now()) {
                        tracing::info!(path = %config_path.display(), "configuration file changed");
                        on_change();
                    }
                }
                Ok(Ok(_)) | Err(mpsc::RecvTimeoutError::Timeout) => {}
                Ok(Err(err)) => tracing::warn!(error = %err, "config watch error"),
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        tracing::debug!("configuration watcher stopped");
    });
}

#[cfg(test)]
mod tests {
    use notify::EventKind;
    use notify::event::{AccessKind, ModifyKind};

    use super::*;

    fn event(kind: EventKind, path: &str) -> Event { Event::new(kind).add_path(PathBuf::from(path)) }

    #[test]
    fn test_debouncer_collapses_bursts() {
        let mut debouncer = Debouncer::default();
        let start = Instant::now();

        assert!(debouncer.accept(start));
        assert!(!debouncer.accept(start + Duration::from_millis(50)));
        assert!(debouncer.accept(start + Duration::from_millis(300)));
    }

    #[test]
    fn test_only_writes_to_the_config_file_count() {
        let name = OsString::from("config.jsonc");

        assert!(touches_file(&event(EventKind::Modify(ModifyKind::Any), "/cfg/config.jsonc"), &name));
        assert!(!touches_file(&event(EventKind::Modify(ModifyKind::Any), "/cfg/other.jsonc"), &name));
        assert!(!touches_file(&event(EventKind::Access(AccessKind::Any), "/cfg/config.jsonc"), &name));
    }

    #[test]
    fn test_watcher_exits_when_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.jsonc");
        std::fs::write(&path, "{}").unwrap();

        let running = Arc::new(AtomicBool::new(true));
        watch_config_file(path, Arc::clone(&running), || {});
        running.store(false, Ordering::SeqCst);

        std::thread::sleep(STOP_POLL * 2);
    }
}
