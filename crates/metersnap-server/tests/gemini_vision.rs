//! Gemini adapter against a local fake of the `generateContent` endpoint.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use metersnap_server::app_state::AppState;
use metersnap_server::config::{GeminiSection, MeterConfig};
use metersnap_server::router::build_router;
use metersnap_server::vision::gemini::extract_number;
use metersnap_server::vision::images::StoredImage;
use metersnap_server::vision::{GeminiVision, ImageStore, VisionAdapter, VisionError};

// 1x1 transparent PNG
const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[derive(Clone)]
struct Fake {
    answer: Value,
    status: StatusCode,
}

async fn generate(State(fake): State<Fake>, headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    let parts = &body["contents"][0]["parts"];
    assert!(parts[0]["text"].is_string());
    assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
    (fake.status, Json(fake.answer.clone()))
}

async fn spawn_fake(answer: Value, status: StatusCode) -> SocketAddr {
    let app = Router::new()
        .route("/v1beta/models/:model", post(generate))
        .with_state(Fake { answer, status });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn answer(text: &str) -> Value {
    json!({ "candidates": [ { "content": { "parts": [ { "text": text } ] } } ] })
}

fn adapter(addr: SocketAddr, key: &str, images: Arc<ImageStore>) -> GeminiVision {
    let cfg = GeminiSection {
        endpoint: format!("http://{addr}/v1beta"),
        ..GeminiSection::default()
    };
    GeminiVision::with_api_key(&cfg, key.into(), Duration::from_secs(5), "http://meters.test/", images)
        .unwrap()
}

#[test]
fn number_extraction() {
    assert_eq!(extract_number("123"), Some(123.0));
    assert_eq!(extract_number("Reading: 00123,45 m3"), Some(123.45));
    assert_eq!(extract_number("about 42.5."), Some(42.5));
    assert_eq!(extract_number("-7"), Some(-7.0));
    assert_eq!(extract_number("no digits here"), None);
}

#[test]
fn image_decoding() {
    let img = StoredImage::decode(PNG_B64).unwrap();
    assert_eq!(img.mime, "image/png");

    let data_url = format!("data:image/png;base64,{PNG_B64}");
    assert_eq!(StoredImage::decode(&data_url).unwrap().bytes, img.bytes);

    assert!(matches!(StoredImage::decode("base64..."), Err(VisionError::InvalidImage(_))));
    // valid base64, not an image
    assert!(matches!(StoredImage::decode("aGVsbG8gd29ybGQ="), Err(VisionError::InvalidImage(_))));
}

#[tokio::test]
async fn reads_value_and_hosts_image() {
    let addr = spawn_fake(answer("The meter shows 00456,7"), StatusCode::OK).await;
    let images = Arc::new(ImageStore::new());
    let vision = adapter(addr, "test-key", Arc::clone(&images));

    let reading = vision.fetch_reading(PNG_B64).await.unwrap();
    assert_eq!(reading.value, 456.7);
    assert!(reading.image_ref.starts_with("http://meters.test/readings/images/"));
    assert_eq!(images.len(), 1);
}

#[tokio::test]
async fn rejected_key_is_unauthorized() {
    let addr = spawn_fake(answer("1"), StatusCode::OK).await;
    let images = Arc::new(ImageStore::new());
    let vision = adapter(addr, "wrong", Arc::clone(&images));

    let err = vision.fetch_reading(PNG_B64).await.unwrap_err();
    assert!(matches!(err, VisionError::Unauthorized(401)));
    assert!(images.is_empty());
}

#[tokio::test]
async fn provider_errors_and_garbage_answers() {
    let addr = spawn_fake(json!({ "error": "overloaded" }), StatusCode::SERVICE_UNAVAILABLE).await;
    let vision = adapter(addr, "test-key", Arc::new(ImageStore::new()));
    assert!(matches!(
        vision.fetch_reading(PNG_B64).await.unwrap_err(),
        VisionError::Status(503, _)
    ));

    let addr = spawn_fake(answer("I cannot read this meter"), StatusCode::OK).await;
    let vision = adapter(addr, "test-key", Arc::new(ImageStore::new()));
    assert!(matches!(
        vision.fetch_reading(PNG_B64).await.unwrap_err(),
        VisionError::Malformed(_)
    ));

    let addr = spawn_fake(json!({ "candidates": [] }), StatusCode::OK).await;
    let vision = adapter(addr, "test-key", Arc::new(ImageStore::new()));
    assert!(matches!(
        vision.fetch_reading(PNG_B64).await.unwrap_err(),
        VisionError::Malformed(_)
    ));
}

#[tokio::test]
async fn submitted_image_is_served_back() {
    let addr = spawn_fake(answer("789"), StatusCode::OK).await;
    let images = Arc::new(ImageStore::new());
    let vision = Arc::new(adapter(addr, "test-key", Arc::clone(&images)));
    let app = build_router(AppState::with_vision_and_images(MeterConfig::default(), images, vision));

    let body = json!({
        "image": PNG_B64,
        "customerCode": "C9",
        "timestamp": "2024-09-01T08:00:00Z",
        "kind": "GAS",
    });
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/readings")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let created: Value = serde_json::from_slice(&res.into_body().collect().await.unwrap().to_bytes()).unwrap();
    assert_eq!(created["value"], 789.0);

    let path = created["imageRef"]
        .as_str()
        .unwrap()
        .trim_start_matches("http://meters.test")
        .to_string();
    let res = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "image/png");

    let res = app
        .oneshot(
            Request::builder()
                .uri("/readings/images/00000000-0000-4000-8000-000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
