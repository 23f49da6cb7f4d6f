//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    api::{self, AppState},
    config::AppConfig,
    core::{
        bus_sync::{NewBusSync, PresenceReading},
        credentials::{self, NewUser},
        leave::NewLeaveRequest,
    },
    entities::{self, Role},
    errors::Result,
};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Password every test user is registered with.
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Secret the test token service signs with.
pub const TEST_SECRET: &str = "test-secret";

/// Creates an in-memory `SQLite` database with all tables initialized.
///
/// The pool is pinned to one connection so every query sees the same
/// in-memory database and concurrent callers queue for it.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database under `dir` with a pool of
/// `max_connections`, so transactions on different connections can interleave.
pub async fn setup_file_db(dir: &TempDir, max_connections: u32) -> Result<DatabaseConnection> {
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("attendance.sqlite").display()
    );
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(max_connections)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers `username` with [`TEST_PASSWORD`] and a capitalised display name.
pub async fn register_test_user(
    db: &DatabaseConnection,
    username: &str,
    role: Role,
) -> Result<entities::user::Model> {
    let mut name = username.to_string();
    if let Some(first) = name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }

    credentials::register(
        db,
        NewUser {
            username: username.to_string(),
            password: TEST_PASSWORD.to_string(),
            role,
            name,
        },
    )
    .await
}

/// The day most attendance tests mark.
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap_or_default()
}

/// A fixed sync time.
pub fn test_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 7, 45, 0)
        .single()
        .unwrap_or_default()
}

/// A leave request with every field filled in.
pub fn test_leave_request() -> NewLeaveRequest {
    NewLeaveRequest {
        student_name: "John Doe".to_string(),
        roll_number: "21CS042".to_string(),
        date: "2024-03-15".to_string(),
        reason: "Inter-college symposium".to_string(),
    }
}

/// A reading for `roll_number` at [`test_timestamp`].
pub fn test_reading(roll_number: &str) -> PresenceReading {
    PresenceReading {
        roll_number: roll_number.to_string(),
        device_name: format!("phone-{roll_number}"),
        device_id: format!("AA:BB:{roll_number}"),
        timestamp: test_timestamp(),
        rssi: -67,
        is_online: true,
    }
}

/// A batch from driver `driver-7` on `route-12`.
pub fn test_bus_sync(readings: Vec<PresenceReading>) -> NewBusSync {
    NewBusSync {
        driver_id: "driver-7".to_string(),
        bus_route: "route-12".to_string(),
        timestamp: test_timestamp(),
        readings,
    }
}

/// A router over a fresh database, with upload directories in a temp dir.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

/// Boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// One part of a multipart form.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

/// Encodes `parts` as a `multipart/form-data` body delimited by [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Builds a [`TestApp`] signing tokens with [`TEST_SECRET`].
pub async fn test_app() -> Result<TestApp> {
    let db = setup_test_db().await?;
    let dir = TempDir::new()?;
    let config = AppConfig {
        secret_key: TEST_SECRET.to_string(),
        upload_dir: dir.path().join("faces"),
        od_upload_dir: dir.path().join("od"),
        max_upload_bytes: 64 * 1024,
        ..AppConfig::default()
    };

    let state = AppState::new(db, &config);
    Ok(TestApp {
        router: api::router(state.clone()),
        state,
        dir,
    })
}

impl TestApp {
    /// Sends `request` and returns the status and the body as JSON.
    ///
    /// Non-JSON bodies (framework rejections) come back as a JSON string.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(request("GET", uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_with_token(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(
            request("GET", uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn json(&self, method: &str, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(
            request(method, uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn multipart(&self, uri: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
        self.send(
            request("POST", uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(parts)))
                .unwrap(),
        )
        .await
    }

    /// Registers `username` through the API and returns the access token.
    pub async fn register(&self, username: &str, role: &str) -> String {
        let (_, body) = self
            .json(
                "POST",
                "/auth/register",
                &serde_json::json!({
                    "username": username,
                    "password": TEST_PASSWORD,
                    "role": role,
                    "name": username,
                }),
            )
            .await;
        body["access_token"].as_str().unwrap_or_default().to_string()
    }
}

fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder().method(method).uri(uri)
}
