//! Path to handler resolution.

use std::collections::BTreeMap;

use crate::routing::table::HandlerId;

/// Maps an application-relative path to the handler that would serve it.
pub trait HandlerResolver: Send + Sync + std::fmt::Debug {
    /// Returns `None` when no handler serves `path`.
    fn resolve(&self, path: &str) -> Option<HandlerId>;
}

/// Handler resolver built from an application's configuration.
///
/// Explicit `paths` win; otherwise the handler is derived from the path
/// segments below `namespace` (`product/detail` becomes
/// `<namespace>::product::detail`, the empty path becomes `<namespace>::index`).
#[derive(Debug, Clone, Default)]
pub struct ConfiguredResolver {
    namespace: Option<String>,
    paths: BTreeMap<String, HandlerId>,
}

impl ConfiguredResolver {
    pub fn new(namespace: Option<String>) -> Self {
        Self {
            namespace,
            paths: BTreeMap::new(),
        }
    }

    /// Bind a path to a handler explicitly.
    pub fn with_path(mut self, path: &str, handler: impl Into<HandlerId>) -> Self {
        self.paths.insert(trim_path(path).to_string(), handler.into());
        self
    }

    fn derive(&self, path: &str) -> Option<HandlerId> {
        let namespace = self.namespace.as_deref()?;
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if segments.is_empty() {
            return Some(HandlerId(format!("{}::index", namespace)));
        }
        let valid = segments
            .iter()
            .all(|s| s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        if !valid {
            return None;
        }
        Some(HandlerId(format!("{}::{}", namespace, segments.join("::").to_ascii_lowercase())))
    }
}

impl HandlerResolver for ConfiguredResolver {
    fn resolve(&self, path: &str) -> Option<HandlerId> {
        let path = trim_path(path);
        if let Some(handler) = self.paths.get(path) {
            return Some(handler.clone());
        }
        self.derive(path)
    }
}

fn trim_path(path: &str) -> &str {
    path.trim_matches('/')
}
