//! Development watcher: convert once, then again whenever the source changes.

use std::{
    path::{Component, Path, PathBuf},
    sync::mpsc::{self, RecvTimeoutError},
    time::{Duration, Instant},
};

use langsheet::Converter;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::convert::{RunOptions, resolve_config};

/// How long to block on the event channel when nothing is pending.
const IDLE_WAIT: Duration = Duration::from_secs(1);

/// Absolute, lexically normalized path with the parent directory canonicalized
/// when it exists, so paths reported by the OS compare equal to configured ones.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other.as_os_str()),
        }
    }

    match (lexical.parent(), lexical.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|parent| parent.join(name))
            .unwrap_or(lexical),
        _ => lexical,
    }
}

/// Create and modify events trigger a run; removals and access do not.
pub fn is_trigger_kind(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Whether `event` touches `source`, which must already be normalized.
pub fn is_source_event(event: &Event, source: &Path) -> bool {
    is_trigger_kind(&event.kind) && event.paths.iter().any(|path| normalize_path(path) == source)
}

/// Trailing-edge debounce: fires once no event has arrived for `window`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_event: None,
        }
    }

    pub fn record(&mut self, now: Instant) {
        self.last_event = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }

    /// Time left before a pending run is due; `None` when nothing is pending.
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        self.last_event
            .map(|last| (last + self.window).saturating_duration_since(now))
    }

    /// Returns true, and clears the pending state, once the window has passed.
    pub fn take_ready(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(last) if now.duration_since(last) >= self.window => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}

fn run_once(converter: &Converter) -> bool {
    match converter.run() {
        Ok(report) => {
            tracing::info!(
                files = report.files.len(),
                engine = %report.engine,
                "translations updated"
            );
            true
        }
        Err(e) => {
            tracing::error!("conversion failed: {}", e);
            false
        }
    }
}

/// Runs until the watcher itself fails. Conversion errors are logged and the
/// watch goes on.
pub fn run_watch_command(options: &RunOptions) -> Result<(), String> {
    let config = resolve_config(options)?;
    let converter = Converter::new(config).map_err(|e| e.to_string())?;
    run_once(&converter);

    let source = normalize_path(converter.source_path());
    let dir = source
        .parent()
        .ok_or_else(|| format!("Cannot watch {}: no parent directory", source.display()))?;

    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(tx, Config::default())
        .map_err(|e| format!("Cannot start file watcher: {}", e))?;
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|e| format!("Cannot watch {}: {}", dir.display(), e))?;
    tracing::info!(source = %source.display(), "watching for changes");

    let mut debouncer = Debouncer::new(converter.config().debounce());
    loop {
        let timeout = debouncer
            .time_until_ready(Instant::now())
            .unwrap_or(IDLE_WAIT);
        match rx.recv_timeout(timeout) {
            Ok(Ok(event)) => {
                if is_source_event(&event, &source) {
                    tracing::debug!(kind = ?event.kind, "source changed");
                    debouncer.record(Instant::now());
                }
            }
            Ok(Err(e)) => tracing::warn!("watch error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return Err("File watcher stopped unexpectedly".to_string());
            }
        }

        if debouncer.take_ready(Instant::now()) {
            run_once(&converter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind};
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path_resolves_dots() {
        let temp = TempDir::new().unwrap();
        let messy = temp.path().join("a/../b/./strings.csv");
        std::fs::create_dir_all(temp.path().join("b")).unwrap();
        assert_eq!(
            normalize_path(&messy),
            normalize_path(&temp.path().join("b/strings.csv"))
        );
        assert!(normalize_path(Path::new("strings.csv")).is_absolute());
    }

    #[test]
    fn test_is_source_event() {
        let temp = TempDir::new().unwrap();
        let source_path = temp.path().join("strings.csv");
        let source = normalize_path(&source_path);

        let modify = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(source_path.clone());
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(source_path.clone());
        let other = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(temp.path().join("other.csv"));
        let remove = Event::new(EventKind::Remove(RemoveKind::File)).add_path(source_path.clone());
        let access = Event::new(EventKind::Access(AccessKind::Any)).add_path(source_path);

        assert!(is_source_event(&modify, &source));
        assert!(is_source_event(&create, &source));
        assert!(!is_source_event(&other, &source));
        assert!(!is_source_event(&remove, &source));
        assert!(!is_source_event(&access, &source));
    }

    #[test]
    fn test_debouncer_coalesces_bursts() {
        let start = Instant::now();
        let window = Duration::from_millis(200);
        let mut debouncer = Debouncer::new(window);
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.time_until_ready(start), None);

        debouncer.record(start);
        debouncer.record(start + Duration::from_millis(150));
        assert!(!debouncer.take_ready(start + Duration::from_millis(300)));
        assert_eq!(
            debouncer.time_until_ready(start + Duration::from_millis(300)),
            Some(Duration::from_millis(50))
        );
        assert!(debouncer.take_ready(start + Duration::from_millis(350)));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.take_ready(start + Duration::from_millis(1000)));
    }
}
