//! Face image upload routes.

use crate::{
    api::AppState,
    core::{
        blob::BlobEntry,
        uploads::{self, FaceUpload},
    },
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::MultipartRejection,
    },
};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct UploadAccepted {
    pub message: &'static str,
    #[serde(flatten)]
    pub upload: FaceUpload,
}

#[derive(Debug, Serialize)]
pub struct UploadList {
    pub uploads: Vec<BlobEntry>,
}

struct ImagePart {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// `POST /upload_face` (multipart `image` + `student_roll`)
pub async fn upload_face(
    State(state): State<AppState>,
    form: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadAccepted>> {
    let mut form = form?;
    let mut student_roll = None;
    let mut image = None;

    while let Some(field) = form.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "student_roll" => student_roll = Some(field.text().await?),
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?.to_vec();
                image = Some(ImagePart {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            other => debug!("Ignoring form field '{}'", other),
        }
    }

    let image = image.ok_or_else(|| Error::invalid_input("missing form field 'image'"))?;
    let student_roll =
        student_roll.ok_or_else(|| Error::invalid_input("missing form field 'student_roll'"))?;

    let upload = uploads::save_face_image(
        &state.face_uploads,
        &student_roll,
        image.file_name.as_deref(),
        image.content_type.as_deref(),
        &image.bytes,
    )
    .await?;

    Ok(Json(UploadAccepted {
        message: "Image uploaded successfully",
        upload,
    }))
}

/// `GET /list_uploads`
pub async fn list_uploads(State(state): State<AppState>) -> Result<Json<UploadList>> {
    let uploads = uploads::list_uploads(&state.face_uploads).await?;
    Ok(Json(UploadList { uploads }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use axum::http::StatusCode;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

    #[tokio::test]
    async fn test_upload_then_list() -> Result<()> {
        let app = test_app().await?;

        let (status, body) = app.get("/list_uploads").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uploads"], serde_json::json!([]));

        let (status, body) = app
            .multipart(
                "/upload_face",
                &[
                    Part::Text("student_roll", "21CS042"),
                    Part::File {
                        name: "image",
                        file_name: "me.png",
                        content_type: "image/png",
                        bytes: PNG_BYTES,
                    },
                ],
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Image uploaded successfully");
        assert_eq!(body["student_roll"], "21CS042");
        assert_eq!(body["file_size"], PNG_BYTES.len());
        let filename = body["filename"].as_str().unwrap_or_default().to_string();
        assert!(filename.starts_with("student_21CS042_"));
        assert!(filename.ends_with("_me.png"));

        let (status, body) = app.get("/list_uploads").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uploads"][0]["filename"], filename.as_str());
        assert_eq!(body["uploads"][0]["size"], PNG_BYTES.len());
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_rejects_non_images() -> Result<()> {
        let app = test_app().await?;

        let (status, body) = app
            .multipart(
                "/upload_face",
                &[
                    Part::Text("student_roll", "21CS042"),
                    Part::File {
                        name: "image",
                        file_name: "notes.txt",
                        content_type: "text/plain",
                        bytes: b"hello",
                    },
                ],
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "File must be an image");

        let (status, _) = app
            .multipart("/upload_face", &[Part::Text("student_roll", "21CS042")])
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app.get("/list_uploads").await;
        assert_eq!(body["uploads"], serde_json::json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn test_oversized_body_is_refused() -> Result<()> {
        let app = test_app().await?;
        let big = vec![0_u8; 128 * 1024];

        let (status, _) = app
            .multipart(
                "/upload_face",
                &[
                    Part::Text("student_roll", "21CS042"),
                    Part::File {
                        name: "image",
                        file_name: "big.png",
                        content_type: "image/png",
                        bytes: &big,
                    },
                ],
            )
            .await;
        assert!(status.is_client_error());

        let (_, body) = app.get("/list_uploads").await;
        assert_eq!(body["uploads"], serde_json::json!([]));
        Ok(())
    }
}
