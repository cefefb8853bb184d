//! Application detection.
//!
//! # Data Flow
//! ```text
//! (Host header, request URI)
//!     → normalize host (last of comma-separated values)
//!     → exact hostname candidates
//!     → otherwise: glob hostname candidates (one per matching pattern)
//!     → base path filter + relative URI
//!     → highest (host pattern length, base path length) wins
//!     → stored in the ApplicationContext
//! ```
//!
//! # Design Decisions
//! - An exact match carries no pattern and scores 0 on the host key, so a
//!   long glob can outrank it; kept for compatibility with existing setups
//! - On a full score tie the application enumerated last wins
//! - Detection is idempotent within a request: an active application is
//!   returned as is

use std::sync::Arc;

use crate::application::{
    ApplicationContext, ApplicationMatch, ApplicationRegistry, UnknownApplicationError,
};
use crate::observability::metrics;
use crate::routing::matcher::{matches_exact, matches_wildcard, relative_uri, within_base_path};

/// Picks the application that owns a request.
#[derive(Debug, Clone)]
pub struct ApplicationResolver {
    registry: Arc<ApplicationRegistry>,
}

impl ApplicationResolver {
    pub fn new(registry: Arc<ApplicationRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ApplicationRegistry> {
        &self.registry
    }

    /// Resolve the application for `host_header` and `request_uri` and make
    /// it active in `context`.
    pub fn detect(
        &self,
        context: &mut ApplicationContext,
        host_header: &str,
        request_uri: &str,
    ) -> Result<Arc<ApplicationMatch>, UnknownApplicationError> {
        if let Ok(active) = context.get() {
            return Ok(active.clone());
        }

        let host = normalize_host(host_header);
        let applications = self.registry.applications();

        let mut candidates: Vec<ApplicationMatch> = applications
            .iter()
            .filter(|app| app.host_patterns.iter().any(|p| matches_exact(host, p)))
            .map(|app| ApplicationMatch {
                application: app.clone(),
                matched_host_pattern: None,
                hostname: host.to_string(),
                request_relative_uri: String::new(),
            })
            .collect();

        if candidates.is_empty() {
            for app in applications.iter() {
                for pattern in app.wildcard_patterns() {
                    if matches_wildcard(host, pattern) {
                        candidates.push(ApplicationMatch {
                            application: app.clone(),
                            matched_host_pattern: Some(pattern.to_string()),
                            hostname: host.to_string(),
                            request_relative_uri: String::new(),
                        });
                    }
                }
            }
        }

        let mut best: Option<ApplicationMatch> = None;
        for mut candidate in candidates {
            let application = &candidate.application;
            if let Some(base_path) = application.explicit_base_path() {
                if !within_base_path(request_uri, base_path) {
                    tracing::debug!(
                        application = %application.name,
                        base_path,
                        request_uri,
                        "Candidate outside base path"
                    );
                    continue;
                }
            }
            candidate.request_relative_uri = relative_uri(request_uri, application.base_path());

            tracing::debug!(
                application = %candidate.name(),
                matched_host_pattern = ?candidate.matched_host_pattern,
                score = ?candidate.score(),
                "Candidate application"
            );

            let replace = best
                .as_ref()
                .map_or(true, |current| candidate.score() >= current.score());
            if replace {
                best = Some(candidate);
            }
        }

        let Some(resolved) = best else {
            tracing::warn!(host, request_uri, "No application found");
            metrics::record_detect("unknown", "");
            return Err(UnknownApplicationError {
                host: host.to_string(),
                request_uri: request_uri.to_string(),
            });
        };

        tracing::info!(
            application = %resolved.name(),
            host,
            request_relative_uri = %resolved.request_relative_uri,
            "Application detected"
        );
        metrics::record_detect("matched", resolved.name());

        let resolved = Arc::new(resolved);
        context.set(Some(resolved.clone()));
        Ok(resolved)
    }
}

/// Use the last value when a proxy appended several hosts.
pub fn normalize_host(host_header: &str) -> &str {
    host_header
        .rsplit(',')
        .next()
        .unwrap_or(host_header)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Application;

    fn resolver(applications: Vec<Application>) -> ApplicationResolver {
        ApplicationResolver::new(Arc::new(ApplicationRegistry::from_applications(applications)))
    }

    fn detect(resolver: &ApplicationResolver, host: &str, uri: &str) -> Result<Arc<ApplicationMatch>, UnknownApplicationError> {
        resolver.detect(&mut ApplicationContext::new(), host, uri)
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("example.com"), "example.com");
        assert_eq!(normalize_host("proxy.internal, example.com"), "example.com");
        assert_eq!(normalize_host("a,b,c"), "c");
    }

    #[test]
    fn test_exact_match() {
        let resolver = resolver(vec![
            Application::new("other", vec!["other.com".into()]),
            Application::new("site", vec!["www.example.com".into(), "example.com".into()]),
        ]);

        let m = detect(&resolver, "example.com", "/x").unwrap();
        assert_eq!(m.name(), "site");
        assert_eq!(m.matched_host_pattern, None);
        assert_eq!(m.request_relative_uri, "/x");
    }

    #[test]
    fn test_longest_wildcard_wins() {
        let resolver = resolver(vec![
            Application::new("api", vec!["api.*.example.com".into()]),
            Application::new("catch-all", vec!["*.example.com".into()]),
        ]);

        let m = detect(&resolver, "api.foo.example.com", "/").unwrap();
        assert_eq!(m.name(), "api");
        assert_eq!(m.matched_host_pattern.as_deref(), Some("api.*.example.com"));

        let m = detect(&resolver, "www.example.com", "/").unwrap();
        assert_eq!(m.name(), "catch-all");
    }

    #[test]
    fn test_exact_match_skips_wildcards() {
        let resolver = resolver(vec![
            Application::new("wild", vec!["*.example.com".into()]),
            Application::new("exact", vec!["www.example.com".into()]),
        ]);
        assert_eq!(detect(&resolver, "www.example.com", "/").unwrap().name(), "exact");
    }

    #[test]
    fn test_base_path_scoping() {
        let resolver = resolver(vec![
            Application::new("root", vec!["example.com".into()]),
            Application::new("shop", vec!["example.com".into()]).with_base_path("/shop"),
            Application::new("blog", vec!["example.com".into()]).with_base_path("/blog"),
        ]);

        let m = detect(&resolver, "example.com", "/shop/cart").unwrap();
        assert_eq!(m.name(), "shop");
        assert_eq!(m.request_relative_uri, "/cart");

        let m = detect(&resolver, "example.com", "/about").unwrap();
        assert_eq!(m.name(), "root");
        assert_eq!(m.request_relative_uri, "/about");
    }

    #[test]
    fn test_base_path_filters_every_candidate() {
        let resolver = resolver(vec![
            Application::new("shop", vec!["example.com".into()]).with_base_path("/shop"),
        ]);
        let err = detect(&resolver, "example.com", "/blog").unwrap_err();
        assert_eq!(err.host, "example.com");
        assert_eq!(err.request_uri, "/blog");
    }

    #[test]
    fn test_unknown_host() {
        let resolver = resolver(vec![Application::new("site", vec!["example.com".into()])]);
        assert!(detect(&resolver, "example.org", "/").is_err());
    }

    #[test]
    fn test_tie_goes_to_last_application() {
        let resolver = resolver(vec![
            Application::new("first", vec!["example.com".into()]),
            Application::new("second", vec!["example.com".into()]),
        ]);
        assert_eq!(detect(&resolver, "example.com", "/").unwrap().name(), "second");
    }

    #[test]
    fn test_detect_is_idempotent_within_request() {
        let resolver = resolver(vec![
            Application::new("a", vec!["a.example.com".into()]),
            Application::new("b", vec!["b.example.com".into()]),
        ]);
        let mut context = ApplicationContext::new();

        let first = resolver.detect(&mut context, "a.example.com", "/").unwrap();
        let second = resolver.detect(&mut context, "b.example.com", "/").unwrap();
        assert_eq!(first.name(), "a");
        assert_eq!(second.name(), "a");

        context.reset();
        assert_eq!(resolver.detect(&mut context, "b.example.com", "/").unwrap().name(), "b");
    }
}
