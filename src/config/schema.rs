//! Configuration schema definitions.
//!
//! Two documents are involved: the router's own configuration file and the
//! per-application configuration read from each application's `config/`
//! directory. All types derive Serde traits for deserialization from TOML.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the router process.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Directory holding one sub-directory per application.
    pub application_path: PathBuf,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Hot reload of the application directory.
    pub reload: ReloadConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            application_path: PathBuf::from("applications"),
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            reload: ReloadConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds, application detection included.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Reload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Watch the application directory and reload on change.
    pub enabled: bool,

    /// Poll interval for the file watcher in seconds.
    pub poll_interval_secs: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: 2,
        }
    }
}

/// Configuration of a single application.
///
/// Assembled from every `*.toml` file in the application's `config/`
/// directory; later files override earlier ones key by key.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ApplicationConfig {
    /// Hostnames claimed by the application, literal or glob.
    #[serde(default)]
    pub hostnames: Vec<String>,

    /// Path prefix the application is mounted under.
    #[serde(default)]
    pub base_uri: Option<String>,

    /// Language injected into reverse routes when none is active.
    #[serde(default)]
    pub default_language: Option<String>,

    /// Namespace handler identities are derived from.
    #[serde(default)]
    pub handler_namespace: Option<String>,

    /// Explicit path → handler bindings.
    #[serde(default)]
    pub handlers: BTreeMap<String, String>,

    /// Route patterns per handler, in priority order.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// Route patterns registered for one handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Handler identity.
    pub handler: String,

    /// Patterns such as `$language[en,nl]/product/$id`.
    pub patterns: Vec<String>,
}
