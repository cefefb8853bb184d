//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Resolve every request to its application in a fresh context
//! - Report the resolution (or 404) as JSON
//!
//! # Design Decisions
//! - One `ApplicationContext` per request, reset before the response leaves
//! - Unknown applications map to 404 Not Found
//! - `x-reverse-route` headers ask for canonical URLs of internal links

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::application::{ApplicationContext, ApplicationMatch, ApplicationResolver};
use crate::config::RouterConfig;
use crate::http::request::{request_host, request_id, request_target, UuidRequestId};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Header listing internal links to rewrite for the resolved application.
pub const X_REVERSE_ROUTE: &str = "x-reverse-route";

/// Header selecting the display language for reverse routes.
pub const X_LANGUAGE: &str = "x-language";

/// State injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: ApplicationResolver,
}

/// Body of a successful resolution.
#[derive(Debug, Serialize)]
pub struct Resolution {
    pub request_id: String,
    pub application: String,
    pub hostname: String,
    pub matched_host_pattern: Option<String>,
    pub base_path: String,
    pub request_relative_uri: String,
    pub route: Option<RouteInfo>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,
}

/// Route the relative URI matched, if any.
#[derive(Debug, Serialize)]
pub struct RouteInfo {
    pub handler: String,
    pub pattern: String,
    pub params: BTreeMap<String, String>,
}

/// Body of a failed resolution.
#[derive(Debug, Serialize)]
pub struct ResolutionError {
    pub request_id: String,
    pub error: String,
    pub host: String,
    pub request_uri: String,
}

/// HTTP front end of the application resolver.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &RouterConfig, resolver: ApplicationResolver) -> Self {
        let state = AppState { resolver };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// The Axum router, for embedding or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .fallback(resolve_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Serve on `listener` until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve the request's application and describe the result.
async fn resolve_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let host = request_host(&request);
    let uri = request_target(&request);

    let mut context = ApplicationContext::new();
    let language = request
        .headers()
        .get(X_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    context.set_language(language);

    let response = match state.resolver.detect(&mut context, &host, &uri) {
        Ok(resolved) => {
            let links = request
                .headers()
                .get_all(X_REVERSE_ROUTE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .map(|link| (link.to_string(), context.rewrite_reverse(link)))
                .collect();

            let body = describe(request_id.clone(), &resolved, links);
            metrics::record_request(200, resolved.name(), start_time);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            metrics::record_request(404, "none", start_time);
            let body = ResolutionError {
                request_id,
                error: e.to_string(),
                host: e.host,
                request_uri: e.request_uri,
            };
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
    };

    context.reset();
    response
}

fn describe(request_id: String, resolved: &ApplicationMatch, links: BTreeMap<String, String>) -> Resolution {
    let application = &resolved.application;
    let route = application
        .routes
        .match_path(&resolved.request_relative_uri)
        .map(|m| RouteInfo {
            handler: m.handler.to_string(),
            pattern: m.pattern.to_string(),
            params: m.params,
        });

    Resolution {
        request_id,
        application: application.name.clone(),
        hostname: resolved.hostname.clone(),
        matched_host_pattern: resolved.matched_host_pattern.clone(),
        base_path: application.base_path().to_string(),
        request_relative_uri: resolved.request_relative_uri.clone(),
        route,
        links,
    }
}
