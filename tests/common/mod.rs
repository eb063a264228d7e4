//! Test helpers for the depot integration tests.
//!
//! Each integration test binary compiles this module separately, so not
//! every helper is used everywhere.
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use tempfile::TempDir;

use depot::web::create_router;
use depot::web::handlers::AppState;
use depot::{BlobStore, Database};

/// A running test application over an in-memory database and a temporary
/// blob root.
pub struct TestApp {
    /// HTTP test server.
    pub server: TestServer,
    /// Shared application state, for reaching the stores directly.
    pub state: Arc<AppState>,
    _dir: TempDir,
}

/// Spin up a test application.
pub async fn spawn_app() -> TestApp {
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blobs = BlobStore::new(dir.path()).expect("Failed to create blob store");

    let state = Arc::new(AppState::new(db, blobs, Duration::from_secs(3600)));
    let router = create_router(state.clone(), &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _dir: dir,
    }
}

/// Register a user and open a session, returning the session token.
pub async fn register_and_connect(app: &TestApp, email: &str, password: &str) -> String {
    let response = app
        .server
        .post("/users")
        .json(&json!({"email": email, "password": password}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    connect(app, email, password).await
}

/// Open a session for an existing user, returning the session token.
pub async fn connect(app: &TestApp, email: &str, password: &str) -> String {
    let credentials = BASE64.encode(format!("{email}:{password}"));
    let response = app
        .server
        .get("/connect")
        .add_header("authorization", format!("Basic {credentials}"))
        .await;
    response.assert_status_ok();

    response.json::<Value>()["token"]
        .as_str()
        .expect("token in connect response")
        .to_string()
}

/// Base64-encode bytes for an upload body.
pub fn b64(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Encode a solid-color PNG of the given dimensions.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([20, 90, 180]),
    ));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .expect("PNG encoding");
    out
}

/// Upload a record and return the response body.
pub async fn upload(app: &TestApp, token: &str, body: Value) -> Value {
    let response = app
        .server
        .post("/files")
        .add_header("x-token", token.to_string())
        .json(&body)
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<Value>()
}
