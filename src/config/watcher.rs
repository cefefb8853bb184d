//! Application directory watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::application::ApplicationRegistry;

/// Watches the application directory and refreshes the registry on change.
pub struct ApplicationWatcher {
    path: PathBuf,
    registry: Arc<ApplicationRegistry>,
    poll_interval: Duration,
}

impl ApplicationWatcher {
    /// Create a new watcher over `path`.
    pub fn new(path: &Path, registry: Arc<ApplicationRegistry>, poll_interval: Duration) -> Self {
        Self {
            path: path.to_path_buf(),
            registry,
            poll_interval,
        }
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let registry = self.registry.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        tracing::info!(paths = ?event.paths, "Application change detected, reloading...");
                        match registry.refresh() {
                            Ok(count) => tracing::info!(applications = count, "Applications reloaded"),
                            Err(e) => tracing::error!(
                                "Failed to reload applications: {}. Keeping current set.",
                                e
                            ),
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        watcher.watch(&self.path, RecursiveMode::Recursive)?;

        tracing::info!(path = ?self.path, "Application watcher started");
        Ok(watcher)
    }
}
