//! Startup orchestration.
//!
//! # Responsibilities
//! - Load every application below the configured directory
//! - Build the resolver shared by all requests
//! - Start the application watcher when reload is enabled

use std::sync::Arc;
use std::time::Duration;

use notify::RecommendedWatcher;

use crate::application::{ApplicationRegistry, ApplicationResolver, DirectorySource};
use crate::config::watcher::ApplicationWatcher;
use crate::config::{ConfigError, RouterConfig};

/// Long-lived services built at startup.
pub struct Services {
    pub registry: Arc<ApplicationRegistry>,
    pub resolver: ApplicationResolver,
    /// Kept alive for as long as reloads are wanted.
    watcher: Option<RecommendedWatcher>,
}

impl Services {
    /// Load applications and wire up the resolver.
    pub fn initialize(config: &RouterConfig) -> Result<Self, ConfigError> {
        let source = DirectorySource::new(&config.application_path);
        let registry = Arc::new(ApplicationRegistry::load(source)?);

        tracing::info!(
            application_path = %config.application_path.display(),
            applications = registry.len(),
            "Applications loaded"
        );
        if registry.is_empty() {
            tracing::warn!("No applications configured, every request will be rejected");
        }

        let watcher = if config.reload.enabled {
            let watcher = ApplicationWatcher::new(
                &config.application_path,
                registry.clone(),
                Duration::from_secs(config.reload.poll_interval_secs),
            );
            match watcher.run() {
                Ok(w) => Some(w),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to start application watcher, hot reload disabled");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            resolver: ApplicationResolver::new(registry.clone()),
            registry,
            watcher,
        })
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }
}
