//! Mapping from [`Error`] to HTTP responses.
//!
//! Every error body is `{"detail": "..."}`. Server-side failures are logged in
//! full and answered with a generic message.

use crate::errors::Error;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

const INTERNAL_DETAIL: &str = "Internal server error";

/// Status code a given error is reported with.
#[must_use]
pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::StudentNotFound { .. }
        | Error::ClassNotFound { .. }
        | Error::LeaveRequestNotFound { .. }
        | Error::BusSyncNotFound { .. } => StatusCode::NOT_FOUND,
        Error::UsernameTaken { .. }
        | Error::NotEnrolled { .. }
        | Error::InvalidInput { .. }
        | Error::NotAnImage { .. }
        | Error::Multipart { .. } => StatusCode::BAD_REQUEST,
        Error::InvalidCredentials | Error::InactiveAccount | Error::Unauthorized => {
            StatusCode::UNAUTHORIZED
        }
        Error::Config { .. }
        | Error::Database(_)
        | Error::Io(_)
        | Error::Json(_)
        | Error::Token(_)
        | Error::PasswordHash { .. }
        | Error::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = status_for(&self);

        let detail = if status.is_server_error() {
            error!("Request failed: {}", self);
            INTERNAL_DETAIL.to_string()
        } else {
            debug!("Request rejected ({}): {}", status, self);
            self.to_string()
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
