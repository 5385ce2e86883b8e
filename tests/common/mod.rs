//! Shared helpers for Web API integration tests.

#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

use filevault::file::Bucket;
use filevault::web::{create_router, AppState};
use filevault::{Config, Database};

/// A running test application.
pub struct TestApp {
    /// Test server around the API router.
    pub server: TestServer,
    /// Shared application state (for direct DB access in assertions).
    pub state: Arc<AppState>,
    _tmp: TempDir,
}

/// Create a test application with an in-memory database and a temp bucket.
pub async fn create_test_app() -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let tmp = TempDir::new().expect("Failed to create temp bucket dir");
    let bucket = Bucket::new(tmp.path()).expect("Failed to create bucket");

    let state = Arc::new(AppState::new(db, bucket, Config::default()));
    let server = TestServer::new(create_router(state.clone())).expect("Failed to create server");

    TestApp {
        server,
        state,
        _tmp: tmp,
    }
}

/// Fetch the most recent one-time code mailed to an address.
pub async fn latest_otp(state: &AppState, email: &str) -> String {
    let body: String = sqlx::query_scalar(
        "SELECT body FROM mail_outbox WHERE recipient = ? ORDER BY id DESC LIMIT 1",
    )
    .bind(email)
    .fetch_one(state.db.pool())
    .await
    .expect("no outbox mail for recipient");

    body.split_whitespace()
        .find(|w| w.len() == 6 && w.chars().all(|c| c.is_ascii_digit()))
        .expect("no code in mail body")
        .to_string()
}

/// Sign a user up, verify the emailed code, and return the account id plus
/// the session cookie.
pub async fn sign_up_and_verify(
    app: &TestApp,
    full_name: &str,
    email: &str,
) -> (String, cookie::Cookie<'static>) {
    let response = app
        .server
        .post("/api/auth/sign-up")
        .json(&json!({ "full_name": full_name, "email": email }))
        .await;
    response.assert_status_ok();

    let account_id = response.json::<Value>()["data"]["account_id"]
        .as_str()
        .expect("no account id in sign-up response")
        .to_string();

    let code = latest_otp(&app.state, email).await;

    let response = app
        .server
        .post("/api/auth/verify")
        .json(&json!({ "account_id": account_id, "code": code }))
        .await;
    response.assert_status_ok();

    let cookie = response.cookie(filevault::SESSION_COOKIE);

    (account_id, cookie)
}

/// Upload a file through the API and return its document as JSON.
pub async fn upload_file(
    app: &TestApp,
    cookie: &cookie::Cookie<'static>,
    filename: &str,
    content: &[u8],
    path: &str,
) -> Value {
    use axum_test::multipart::{MultipartForm, Part};

    let form = MultipartForm::new()
        .add_part("file", Part::bytes(content.to_vec()).file_name(filename))
        .add_text("path", path);

    let response = app
        .server
        .post("/api/files")
        .add_cookie(cookie.clone())
        .multipart(form)
        .await;
    response.assert_status_ok();

    response.json::<Value>()["data"].clone()
}
