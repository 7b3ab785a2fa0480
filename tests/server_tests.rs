//! # Server Tests
//!
//! Drive the router in-process with `tower::ServiceExt::oneshot`. Fetchers
//! are stubbed so the tests run offline.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use image::DynamicImage;
use tower::ServiceExt;

use slidegen::compose::Renderer;
use slidegen::fetch::{FetchError, ImageSource, MapSource};
use slidegen::json_api::MapSpec;
use slidegen::server::{AppState, router};
use slidegen::text::FontLibrary;

struct Offline;

#[async_trait]
impl ImageSource for Offline {
    async fn fetch_image(&self, _url: &str) -> Result<DynamicImage, FetchError> {
        Err(FetchError::Timeout)
    }
}

#[async_trait]
impl MapSource for Offline {
    async fn fetch_map(&self, _spec: &MapSpec) -> Result<DynamicImage, FetchError> {
        Err(FetchError::NoTiles)
    }
}

fn app() -> axum::Router {
    let renderer = Renderer::new(FontLibrary::bitmap(), Arc::new(Offline), Arc::new(Offline)).with_seed(3);
    router(Arc::new(AppState::with_renderer(renderer)))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_generate_returns_png() {
    let response = app()
        .oneshot(post_json(
            "/generate",
            r#"{"title": "Q1 Report", "graph": {"type": "bar", "data": [1, 2, 3], "labels": ["a", "b", "c"]}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let decoded = image::load_from_memory(&body).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1920, 1080));
}

#[tokio::test]
async fn test_generate_vertical() {
    let response = app()
        .oneshot(post_json("/generate", r#"{"format": "vertical", "title": "Story"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let decoded = image::load_from_memory(&body).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1080, 1920));
}

#[tokio::test]
async fn test_unreachable_image_still_renders() {
    let response = app()
        .oneshot(post_json("/generate", r#"{"image": {"url": "http://unreachable.invalid/a.png"}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_out_of_range_latitude_is_rejected() {
    let response = app()
        .oneshot(post_json("/generate", r#"{"map": {"lat": 200.0, "lon": 0.0}}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("lat"));
}

#[tokio::test]
async fn test_unknown_format_is_rejected() {
    let response = app()
        .oneshot(post_json("/generate", r#"{"format": "diagonal"}"#))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_schema_endpoint() {
    let response = app()
        .oneshot(get("/.well-known/schemas/slide-generator.json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let schema: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(schema["properties"]["graph"].is_object());
    assert!(schema["properties"]["format"].is_object());
}

#[tokio::test]
async fn test_health() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"ok");
}
