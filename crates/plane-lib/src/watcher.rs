//! Static label list watcher
//!
//! Operators maintain a plain-text file with one label per line; the plane
//! exports the current list through the observability gauge. The watcher
//! reloads the file whenever it changes and keeps watching across the
//! rename-and-replace pattern editors and configmap mounts use, by
//! watching the parent directory rather than the file itself.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::PlaneError;

type Listener = Box<dyn Fn(&[String]) + Send + Sync>;

pub struct StaticLabelWatcher {
    path: PathBuf,
    labels: Arc<RwLock<Vec<String>>>,
    listener: Option<Listener>,
}

/// Keeps the filesystem watcher and its processing task alive; dropping the
/// handle stops watching.
pub struct WatcherHandle {
    _watcher: RecommendedWatcher,
    _task: JoinHandle<()>,
}

/// Read the label file. Every line is an entry, blank lines included, so
/// line numbers stay meaningful to operators.
pub fn load_labels(path: &Path) -> Result<Vec<String>, PlaneError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        PlaneError::internal(format!("cannot read label file {:?}: {}", path, e))
    })?;
    Ok(contents.lines().map(str::to_string).collect())
}

impl StaticLabelWatcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StaticLabelWatcher {
            path: path.into(),
            labels: Arc::new(RwLock::new(Vec::new())),
            listener: None,
        }
    }

    /// Invoke `listener` with the fresh list after every successful reload.
    pub fn with_listener(mut self, listener: impl Fn(&[String]) + Send + Sync + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Current label list.
    pub fn labels(&self) -> Vec<String> {
        self.labels.read().unwrap().clone()
    }

    fn reload(
        path: &Path,
        labels: &RwLock<Vec<String>>,
        listener: Option<&Listener>,
    ) -> Result<(), PlaneError> {
        let fresh = load_labels(path)?;
        debug!(path = %path.display(), entries = fresh.len(), "reloaded static label list");
        if let Some(listener) = listener {
            listener(&fresh);
        }
        *labels.write().unwrap() = fresh;
        Ok(())
    }

    /// Load the file once and start watching for changes.
    pub fn start(self) -> Result<WatcherHandle, PlaneError> {
        let StaticLabelWatcher {
            path,
            labels,
            listener,
        } = self;

        Self::reload(&path, &labels, listener.as_ref())?;

        // Events carry absolute, normalized paths; resolve ours once so a
        // relative or `..`-laden configuration value still matches.
        let path = path.canonicalize().map_err(|e| {
            PlaneError::internal(format!("cannot resolve label file {:?}: {}", path, e))
        })?;

        let (tx, rx) = std::sync::mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = tx.send(event);
                }
            },
            notify::Config::default(),
        )
        .map_err(|e| PlaneError::internal(format!("cannot create filesystem watcher: {}", e)))?;

        // Watching the directory keeps the subscription valid when the file
        // is replaced by rename.
        let watch_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                PlaneError::internal(format!("cannot watch {:?}: {}", watch_dir, e))
            })?;
        info!(path = %path.display(), "watching static label file");

        let task = tokio::task::spawn_blocking(move || loop {
            match rx.recv() {
                Ok(event) => {
                    let relevant = event.paths.iter().any(|p| p == &path);
                    if !relevant {
                        continue;
                    }
                    if let Err(e) = Self::reload(&path, &labels, listener.as_ref()) {
                        // A rename-and-replace can surface a transient
                        // missing file; keep the previous list.
                        warn!(error = %e, "static label reload failed, keeping previous list");
                    }
                }
                Err(_) => {
                    debug!("label watcher channel closed");
                    break;
                }
            }
        });

        Ok(WatcherHandle {
            _watcher: watcher,
            _task: task,
        })
    }
}
