//! Face image uploads.
//!
//! Images are written to the face [`BlobStore`] as
//! `student_{roll}_{YYYYmmdd_HHMMSS}_{original name}`.

use crate::{
    core::blob::{BlobEntry, BlobStore, client_file_name, sanitize_component},
    errors::{Error, Result},
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

/// Outcome of a stored face image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaceUpload {
    pub filename: String,
    pub student_roll: String,
    pub file_size: u64,
    pub upload_time: String,
}

/// Whether a declared content type is an image type.
#[must_use]
pub fn is_image(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
}

/// Stores a student's face image.
pub async fn save_face_image(
    store: &BlobStore,
    student_roll: &str,
    file_name: Option<&str>,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<FaceUpload> {
    if !is_image(content_type) {
        return Err(Error::NotAnImage {
            content_type: content_type.map(str::to_string),
        });
    }
    if student_roll.trim().is_empty() {
        return Err(Error::invalid_input("student_roll cannot be empty"));
    }

    let upload_time = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let original = client_file_name(file_name.unwrap_or("image"));
    let filename = format!(
        "student_{}_{}_{}",
        sanitize_component(student_roll),
        upload_time,
        original
    );

    let handle = store.put(&filename, bytes).await?;
    let file_size = store.size(&handle).await?;
    info!("Stored face image {} ({} bytes)", handle.as_str(), file_size);

    Ok(FaceUpload {
        filename: handle.into_string(),
        student_roll: student_roll.to_string(),
        file_size,
        upload_time,
    })
}

/// Lists stored face images.
pub async fn list_uploads(store: &BlobStore) -> Result<Vec<BlobEntry>> {
    store.list().await
}
