//! Application descriptors and match results.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::schema::ApplicationConfig;
use crate::config::ConfigError;
use crate::routing::handler::{ConfiguredResolver, HandlerResolver};
use crate::routing::matcher::{is_wildcard, normalize_base_path};
use crate::routing::reverse::ReverseResolver;
use crate::routing::table::RouteTable;

/// A configured tenant/site.
#[derive(Debug)]
pub struct Application {
    /// Directory name the application was loaded from.
    pub name: String,

    /// Literal and glob hostnames, in configuration order.
    pub host_patterns: Vec<String>,

    /// Explicitly configured base path, normalized (never empty).
    base_path: Option<String>,

    pub routes: RouteTable,

    pub handlers: Arc<dyn HandlerResolver>,

    /// Resolved filesystem path of the application directory.
    pub path: PathBuf,

    pub default_language: Option<String>,
}

impl Application {
    pub fn new(name: impl Into<String>, host_patterns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            host_patterns,
            base_path: None,
            routes: RouteTable::new(),
            handlers: Arc::new(ConfiguredResolver::default()),
            path: PathBuf::new(),
            default_language: None,
        }
    }

    /// Build an application from its parsed configuration, compiling routes.
    pub fn from_config(
        name: &str,
        path: PathBuf,
        config: ApplicationConfig,
    ) -> Result<Self, ConfigError> {
        let mut routes = RouteTable::new();
        for route in &config.routes {
            for pattern in &route.patterns {
                routes
                    .add(route.handler.as_str(), pattern)
                    .map_err(|source| ConfigError::Pattern {
                        handler: route.handler.clone(),
                        source,
                    })?;
            }
        }

        let handlers = config
            .handlers
            .iter()
            .fold(ConfiguredResolver::new(config.handler_namespace), |resolver, (path, handler)| {
                resolver.with_path(path, handler.as_str())
            });

        let mut application = Self::new(name, config.hostnames)
            .with_routes(routes)
            .with_handlers(Arc::new(handlers))
            .with_path(path);
        application.default_language = config.default_language;
        if let Some(base_path) = config.base_uri.as_deref() {
            application = application.with_base_path(base_path);
        }
        Ok(application)
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = Some(normalize_base_path(base_path).to_string());
        self
    }

    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_handlers(mut self, handlers: Arc<dyn HandlerResolver>) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    /// Effective base path; `/` when none is configured.
    pub fn base_path(&self) -> &str {
        self.base_path.as_deref().unwrap_or("/")
    }

    /// Base path as configured, if any.
    pub fn explicit_base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// Host patterns that take part in glob matching.
    pub fn wildcard_patterns(&self) -> impl Iterator<Item = &str> {
        self.host_patterns
            .iter()
            .map(String::as_str)
            .filter(|p| is_wildcard(p))
    }

    /// Reverse resolver over this application's routes.
    pub fn reverse_resolver(&self) -> ReverseResolver<'_> {
        ReverseResolver::new(&self.routes, self.handlers.as_ref())
    }
}

/// An application selected for a request.
///
/// Wildcard matches record the pattern that matched instead of mutating
/// the shared descriptor.
#[derive(Debug, Clone)]
pub struct ApplicationMatch {
    pub application: Arc<Application>,

    /// Glob pattern the host matched; `None` for exact matches.
    pub matched_host_pattern: Option<String>,

    /// Host the request was made for.
    pub hostname: String,

    /// Request URI relative to the application's base path.
    pub request_relative_uri: String,
}

impl ApplicationMatch {
    pub fn name(&self) -> &str {
        &self.application.name
    }

    /// Specificity score: (matched host pattern length, base path length).
    ///
    /// Exact host matches carry no pattern and score 0 on the first key.
    pub fn score(&self) -> (usize, usize) {
        let host = self
            .matched_host_pattern
            .as_deref()
            .map_or(0, |p| p.chars().count());
        let base = self
            .application
            .explicit_base_path()
            .map_or(0, |p| p.chars().count());
        (host, base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;
    use crate::routing::table::HandlerId;

    #[test]
    fn test_base_path_normalization() {
        let app = Application::new("a", vec!["example.com".into()]);
        assert_eq!(app.base_path(), "/");
        assert_eq!(app.explicit_base_path(), None);

        let app = app.with_base_path("");
        assert_eq!(app.explicit_base_path(), Some("/"));
    }

    #[test]
    fn test_from_config() {
        let config = ApplicationConfig {
            hostnames: vec!["shop.example.com".into(), "*.shop.example.com".into()],
            base_uri: Some("/shop".into()),
            handler_namespace: Some("shop".into()),
            routes: vec![RouteConfig {
                handler: "shop::product".into(),
                patterns: vec!["product/$id".into()],
            }],
            ..Default::default()
        };

        let app = Application::from_config("shop", PathBuf::from("/srv/shop"), config).unwrap();
        assert_eq!(app.base_path(), "/shop");
        assert_eq!(app.wildcard_patterns().collect::<Vec<_>>(), vec!["*.shop.example.com"]);
        assert_eq!(app.routes.lookup(&HandlerId::from("shop::product")).len(), 1);
        assert_eq!(app.handlers.resolve("product"), Some(HandlerId::from("shop::product")));
    }

    #[test]
    fn test_from_config_rejects_bad_pattern() {
        let config = ApplicationConfig {
            hostnames: vec!["example.com".into()],
            routes: vec![RouteConfig {
                handler: "app::x".into(),
                patterns: vec!["$id/$id".into()],
            }],
            ..Default::default()
        };

        let err = Application::from_config("x", PathBuf::new(), config).unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { .. }));
    }

    #[test]
    fn test_score() {
        let app = Arc::new(Application::new("a", vec!["*.example.com".into()]).with_base_path("/shop"));
        let m = ApplicationMatch {
            application: app,
            matched_host_pattern: Some("*.example.com".into()),
            hostname: "x.example.com".into(),
            request_relative_uri: "/".into(),
        };
        assert_eq!(m.score(), (13, 5));
    }
}
