#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use songbook_db::{AppState, JsonFileStore, SongStore};
use songbook_server::{build_router, config::ServerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const PREFIX: &str = "/api/v1";

pub struct TestApp {
    pub router: Router,
    pub db_path: PathBuf,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).expect("response body should be JSON")
    }
}

/// App backed by a fresh document in a temp dir.
pub fn test_app() -> TestApp {
    test_app_with(ServerConfig::default())
}

pub fn test_app_with(config: ServerConfig) -> TestApp {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("data").join("db.json");
    let store = JsonFileStore::new(db_path.clone()).with_backup(dir.path().join("data").join("db_backup.json"));
    TestApp {
        router: router_for(store, &config),
        db_path,
        _dir: dir,
    }
}

pub fn router_for(store: JsonFileStore, config: &ServerConfig) -> Router {
    router_with_store(Arc::new(store), config)
}

pub fn router_with_store(store: Arc<dyn SongStore>, config: &ServerConfig) -> Router {
    let state = Arc::new(AppState {
        store,
        app_name: config.app_name.clone(),
        version: "0.1.0".to_string(),
    });
    build_router(state, config)
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        send(&self.router, request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Request::delete(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(json_request("POST", uri, &body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(json_request("PUT", uri, &body)).await
    }

    /// Create a song through the versioned API and return its id.
    pub async fn create(&self, title: &str, artist: &str) -> u64 {
        let resp = self
            .post_json(
                &format!("{PREFIX}/songs"),
                serde_json::json!({ "titulo": title, "artista": artist }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.text);
        resp.json()["id"].as_u64().unwrap()
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        text: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}
