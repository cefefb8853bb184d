//! Resolution service driven through the Axum router.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use app_router::application::{ApplicationRegistry, ApplicationResolver, DirectorySource};
use app_router::{HttpServer, RouterConfig};

mod common;

fn server(apps: &common::TestApplications) -> HttpServer {
    let registry = ApplicationRegistry::load(DirectorySource::new(apps.path())).unwrap();
    let resolver = ApplicationResolver::new(Arc::new(registry));
    HttpServer::new(&RouterConfig::default(), resolver)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_resolves_application_and_route() {
    let apps = common::shop_fixture();
    let router = server(&apps).router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/blog/2024/hello?utm=x")
                .header("host", "example.com:8080")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["application"], "blog");
    assert_eq!(body["hostname"], "example.com");
    assert_eq!(body["base_path"], "/blog");
    assert_eq!(body["request_relative_uri"], "/2024/hello?utm=x");
    assert_eq!(body["route"]["handler"], "blog::post");
    assert_eq!(body["route"]["params"]["year"], "2024");
    assert!(body.get("links").is_none());
}

#[tokio::test]
async fn test_rewrites_requested_links() {
    let apps = common::shop_fixture();
    let router = server(&apps).router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/")
                .header("host", "eu.shop.example.com")
                .header("x-language", "nl")
                .header("x-reverse-route", "catalog/item?id=7")
                .header("x-reverse-route", "search?q=boots")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["application"], "shop");
    assert_eq!(body["matched_host_pattern"], "*.shop.example.com");
    assert_eq!(body["links"]["catalog/item?id=7"], "/nl/product/7");
    assert_eq!(body["links"]["search?q=boots"], "/search/boots");
}

#[tokio::test]
async fn test_unknown_application_is_404() {
    let apps = common::shop_fixture();
    let router = server(&apps).router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/anything")
                .header("host", "nowhere.test")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["x-request-id"], "req-123");

    let body = body_json(response).await;
    assert_eq!(body["request_id"], "req-123");
    assert_eq!(body["host"], "nowhere.test");
    assert_eq!(body["request_uri"], "/anything");
}

#[tokio::test]
async fn test_serves_until_shutdown() {
    let apps = common::shop_fixture();
    let server = server(&apps);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let shutdown = Arc::new(app_router::Shutdown::new());

    let handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { server.run(listener, &shutdown).await })
    };

    shutdown.trigger();
    tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
