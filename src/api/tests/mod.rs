use super::*;
use crate::config::PersistenceConfig;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tempfile::tempdir;
use tower::ServiceExt;


/// Config pointing at a fresh SQLite file inside `dir`
fn test_config(dir: &tempfile::TempDir) -> Config {
    Config {
        persistence: PersistenceConfig {
            database_path: dir.path().join("sub-store.db"),
        },
        ..Default::default()
    }
}

/// Helper to create a test SubStore backed by a temporary database
async fn create_test_service() -> (Arc<SubStore>, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let service = SubStore::new(test_config(&temp_dir)).await.unwrap();
    (Arc::new(service), temp_dir)
}

/// Router over a fresh service, plus the service for direct inspection
async fn create_test_app() -> (Router, Arc<SubStore>, tempfile::TempDir) {
    let (service, temp_dir) = create_test_service().await;
    let app = create_router(service.clone(), service.get_config());
    (app, service, temp_dir)
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    TestResponse {
        status,
        headers,
        body,
    }
}

#[tokio::test]
async fn test_api_server_stops_on_shutdown_signal() {
    let (service, _temp_dir) = create_test_service().await;

    let mut config = (*service.get_config()).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let api_handle = tokio::spawn(start_api_server_with_shutdown(service, config, async {
        rx.await.ok();
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), api_handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_spawn_api_server_method() {
    let temp_dir = tempdir().unwrap();
    let mut config = test_config(&temp_dir);
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let service = Arc::new(SubStore::new(config).await.unwrap());

    let api_handle = service.spawn_api_server();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be running");

    api_handle.abort();
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let (service, _temp_dir) = create_test_service().await;

    // Occupy a port so the server cannot bind it
    let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = (*service.get_config()).clone();
    config.server.api.bind_address = blocker.local_addr().unwrap();

    let result = start_api_server(service, Arc::new(config)).await;
    assert!(matches!(result, Err(crate::Error::Io(_))));
}

#[tokio::test]
async fn test_cors_enabled() {
    let (service, _temp_dir) = create_test_service().await;

    let mut config = (*service.get_config()).clone();
    config.server.api.cors_enabled = true;
    config.server.api.cors_origins = vec!["*".to_string()];
    let app = create_router(service, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let (service, _temp_dir) = create_test_service().await;

    let mut config = (*service.get_config()).clone();
    config.server.api.cors_origins = vec!["https://sub.example.com".to_string()];
    let app = create_router(service, Arc::new(config));

    let allowed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "https://sub.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        allowed.headers().get("access-control-allow-origin").unwrap(),
        "https://sub.example.com"
    );

    let denied = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "https://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(!denied.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_disabled() {
    let (service, _temp_dir) = create_test_service().await;

    let mut config = (*service.get_config()).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(service, Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}
