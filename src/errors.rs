//! Unified error type for the attendance backend.
//!
//! Domain failures get their own variants so the HTTP layer can pick a status
//! code without inspecting messages. Infrastructure failures wrap their source.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token encoding error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {message}")]
    PasswordHash { message: String },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid multipart body: {message}")]
    Multipart { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Student '{name}' not found. Enroll first.")]
    StudentNotFound { name: String },

    #[error("Class '{name}' not found")]
    ClassNotFound { name: String },

    #[error("Student '{student}' is not enrolled in class '{class}'")]
    NotEnrolled { student: String, class: String },

    #[error("OD request not found")]
    LeaveRequestNotFound { id: i64 },

    #[error("Bus sync batch not found")]
    BusSyncNotFound { id: i64 },

    #[error("Username already registered")]
    UsernameTaken { username: String },

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Inactive user")]
    InactiveAccount,

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("File must be an image")]
    NotAnImage { content_type: Option<String> },
}

impl Error {
    /// Shorthand for building an [`Error::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash {
            message: value.to_string(),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for Error {
    fn from(value: axum::extract::multipart::MultipartError) -> Self {
        Self::Multipart {
            message: value.body_text(),
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for Error {
    fn from(value: axum::extract::rejection::JsonRejection) -> Self {
        Self::invalid_input(value.body_text())
    }
}

impl From<axum::extract::rejection::QueryRejection> for Error {
    fn from(value: axum::extract::rejection::QueryRejection) -> Self {
        Self::invalid_input(value.body_text())
    }
}

impl From<axum::extract::rejection::PathRejection> for Error {
    fn from(value: axum::extract::rejection::PathRejection) -> Self {
        Self::invalid_input(value.body_text())
    }
}

impl From<axum::extract::multipart::MultipartRejection> for Error {
    fn from(value: axum::extract::multipart::MultipartRejection) -> Self {
        Self::Multipart {
            message: value.body_text(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
