//! Application registry.
//!
//! # Responsibilities
//! - Enumerate applications from a configuration source
//! - Hold an immutable snapshot of the loaded applications
//! - Swap in a fresh snapshot on reload
//!
//! # Design Decisions
//! - Readers never block: the snapshot lives behind `ArcSwap`
//! - One broken application is logged and skipped, never fatal for the rest
//! - A failing enumeration keeps the previous snapshot

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::application::Application;
use crate::config::loader::{list_applications, load_application};
use crate::config::ConfigError;
use crate::observability::metrics;

/// Source of application configuration.
pub trait ApplicationSource: Send + Sync {
    /// Names of all configured applications, in a stable order.
    fn list_application_names(&self) -> Result<Vec<String>, ConfigError>;

    /// Load one application by name.
    fn load(&self, name: &str) -> Result<Application, ConfigError>;
}

/// Applications stored as sub-directories of one root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ApplicationSource for DirectorySource {
    fn list_application_names(&self) -> Result<Vec<String>, ConfigError> {
        list_applications(&self.root)
    }

    fn load(&self, name: &str) -> Result<Application, ConfigError> {
        load_application(&self.root, name)
    }
}

type Snapshot = Vec<Arc<Application>>;

/// Loaded applications, in enumeration order.
pub struct ApplicationRegistry {
    source: Option<Box<dyn ApplicationSource>>,
    snapshot: ArcSwap<Snapshot>,
}

impl ApplicationRegistry {
    /// Load every application from `source`.
    ///
    /// Fails only when the applications cannot be enumerated at all.
    pub fn load(source: impl ApplicationSource + 'static) -> Result<Self, ConfigError> {
        let registry = Self {
            source: Some(Box::new(source)),
            snapshot: ArcSwap::from_pointee(Vec::new()),
        };
        registry.refresh()?;
        Ok(registry)
    }

    /// A fixed registry, mostly useful for tests and embedding.
    pub fn from_applications(applications: Vec<Application>) -> Self {
        let snapshot: Snapshot = applications.into_iter().map(Arc::new).collect();
        metrics::record_applications(snapshot.len());
        Self {
            source: None,
            snapshot: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Reload all applications from the source and swap the snapshot.
    ///
    /// Returns the number of applications now registered.
    pub fn refresh(&self) -> Result<usize, ConfigError> {
        let Some(source) = self.source.as_ref() else {
            return Ok(self.snapshot.load().len());
        };

        let names = source.list_application_names()?;
        let mut applications = Vec::with_capacity(names.len());
        for name in names {
            match source.load(&name) {
                Ok(application) => {
                    tracing::debug!(
                        application = %name,
                        hostnames = ?application.host_patterns,
                        base_path = application.base_path(),
                        "Application loaded"
                    );
                    applications.push(Arc::new(application));
                }
                Err(e) => {
                    tracing::warn!(application = %name, error = %e, "Skipping application");
                }
            }
        }

        let count = applications.len();
        self.snapshot.store(Arc::new(applications));
        metrics::record_applications(count);
        Ok(count)
    }

    /// Current snapshot of all applications.
    pub fn applications(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// Look up an application by name.
    pub fn get(&self, name: &str) -> Option<Arc<Application>> {
        self.snapshot
            .load()
            .iter()
            .find(|app| app.name == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ApplicationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationRegistry")
            .field("applications", &self.len())
            .finish()
    }
}
