//! Request-scoped active application.
//!
//! # Responsibilities
//! - Hold the application resolved for the current request
//! - Answer "which application is active" for code running later in it
//! - Support nested dispatch with save/restore semantics
//!
//! # Design Decisions
//! - One context per request, passed by reference; no process-wide state
//! - Nested overrides go through `ContextGuard`, which restores the outer
//!   application when dropped (also on early return or unwinding)
//! - Link rewriting never fails; without an application links pass through

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::application::{Application, ApplicationMatch, NoApplicationSetError};
use crate::routing::rewrite;

/// Holder of the currently active application.
#[derive(Debug, Default)]
pub struct ApplicationContext {
    active: Option<Arc<ApplicationMatch>>,
    language: Option<String>,
}

impl ApplicationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active application.
    pub fn get(&self) -> Result<&Arc<ApplicationMatch>, NoApplicationSetError> {
        self.active.as_ref().ok_or(NoApplicationSetError)
    }

    pub fn is_set(&self) -> bool {
        self.active.is_some()
    }

    /// Replace the active application outright.
    pub fn set(&mut self, application: Option<Arc<ApplicationMatch>>) {
        self.active = application;
    }

    /// Clear all request state.
    pub fn reset(&mut self) {
        self.active = None;
        self.language = None;
    }

    /// Current display language.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn set_language(&mut self, language: Option<String>) {
        self.language = language;
    }

    /// Make `application` active until the returned guard is dropped.
    pub fn push(&mut self, application: Arc<ApplicationMatch>) -> ContextGuard<'_> {
        let previous = self.active.replace(application);
        let previous_language = self.language.clone();
        ContextGuard {
            context: self,
            previous,
            previous_language,
        }
    }

    /// Hand the current request over to another application.
    ///
    /// The nested application inherits the outer hostname and relative URI.
    pub fn enter(
        &mut self,
        application: Arc<Application>,
    ) -> Result<ContextGuard<'_>, NoApplicationSetError> {
        let outer = self.get()?;
        let nested = ApplicationMatch {
            application,
            matched_host_pattern: None,
            hostname: outer.hostname.clone(),
            request_relative_uri: outer.request_relative_uri.clone(),
        };
        tracing::debug!(
            outer = outer.name(),
            nested = nested.name(),
            "Entering nested application"
        );
        Ok(self.push(Arc::new(nested)))
    }

    /// Canonical URL for `url` in the active application.
    pub fn rewrite_reverse(&self, url: &str) -> String {
        let Some(active) = self.active.as_ref() else {
            return url.to_string();
        };
        let application = &active.application;
        let language = self
            .language
            .as_deref()
            .or(application.default_language.as_deref());

        let reverse = application.reverse_resolver().with_language(language);
        rewrite::rewrite_reverse(&reverse, application.explicit_base_path(), url)
    }

    /// Rewrite root-relative links in an HTML document.
    pub fn rewrite_reverse_html(&self, html: &str) -> String {
        rewrite::rewrite_reverse_html(html, |link| self.rewrite_reverse(link))
    }

    /// Rewrite `url(...)` references in a stylesheet.
    pub fn rewrite_reverse_css(&self, css: &str) -> String {
        rewrite::rewrite_reverse_css(css, |link| self.rewrite_reverse(link))
    }
}

/// Restores the previous application when dropped.
#[derive(Debug)]
pub struct ContextGuard<'a> {
    context: &'a mut ApplicationContext,
    previous: Option<Arc<ApplicationMatch>>,
    previous_language: Option<String>,
}

impl Deref for ContextGuard<'_> {
    type Target = ApplicationContext;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.context.active = self.previous.take();
        self.context.language = self.previous_language.take();
    }
}
