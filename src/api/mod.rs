//! HTTP/JSON surface.
//!
//! Handlers are thin: they decode the request, call into [`crate::core`] and
//! encode the result. Failures travel as [`crate::errors::Error`] and are
//! turned into responses in [`error`].

pub mod attendance;
pub mod auth;
pub mod bus_sync;
pub mod error;
pub mod extract;
pub mod leave;
pub mod uploads;

use crate::{
    config::AppConfig,
    core::{blob::BlobStore, token::TokenService},
    errors::Result,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// Issues and verifies bearer tokens
    pub tokens: Arc<TokenService>,
    /// Face images
    pub face_uploads: Arc<BlobStore>,
    /// Leave request attachments
    pub od_uploads: Arc<BlobStore>,
    /// Request body cap applied by the router
    pub max_upload_bytes: usize,
}

impl AppState {
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        Self {
            db,
            tokens: Arc::new(TokenService::new(&config.secret_key, config.token_ttl())),
            face_uploads: Arc::new(BlobStore::new(config.upload_dir.clone())),
            od_uploads: Arc::new(BlobStore::new(config.od_upload_dir.clone())),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Body of responses that only carry a confirmation.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Builds the full route table.
pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/validate", get(auth::validate))
        .route("/auth/me", get(auth::me))
        .route("/enroll", post(attendance::enroll))
        .route("/mark_attendance", post(attendance::mark_attendance))
        .route("/attendance/update", put(attendance::update_attendance))
        .route("/class_attendance", get(attendance::class_attendance))
        .route(
            "/od_requests",
            post(leave::submit_leave_request).get(leave::list_leave_requests),
        )
        .route(
            "/od_requests/{id}",
            get(leave::get_leave_request).put(leave::update_leave_request),
        )
        .route(
            "/bus_sync",
            post(bus_sync::sync_bus_data).get(bus_sync::bus_sync_history),
        )
        .route("/bus_sync/{id}/students", get(bus_sync::bus_sync_students))
        .route("/upload_face", post(uploads::upload_face))
        .route("/list_uploads", get(uploads::list_uploads))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `config.bind_addr` and serves until Ctrl-C.
pub async fn serve(config: &AppConfig, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
