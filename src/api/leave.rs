//! On-duty (OD) leave request routes.

use crate::{
    api::{
        AppState,
        extract::{JsonBody, PathParam},
    },
    core::leave::{self, Attachment, NewLeaveRequest},
    entities::{LeaveStatus, leave_request},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::MultipartRejection,
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A leave request as returned to clients.
#[derive(Debug, Serialize)]
pub struct LeaveRequestView {
    pub id: i64,
    pub student_name: String,
    pub roll_number: String,
    pub date: String,
    pub reason: String,
    pub file_name: Option<String>,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
}

impl From<leave_request::Model> for LeaveRequestView {
    fn from(model: leave_request::Model) -> Self {
        Self {
            id: model.id,
            student_name: model.student_name,
            roll_number: model.roll_number,
            date: model.date,
            reason: model.reason,
            file_name: model.file_name,
            status: model.status,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmittedResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub request: LeaveRequestView,
}

#[derive(Debug, Serialize)]
pub struct LeaveRequestList {
    pub requests: Vec<LeaveRequestView>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdated {
    pub message: String,
    pub request_id: i64,
    pub status: LeaveStatus,
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value.ok_or_else(|| Error::invalid_input(format!("missing form field '{field}'")))
}

/// `POST /od_requests` (multipart)
pub async fn submit_leave_request(
    State(state): State<AppState>,
    form: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmittedResponse>> {
    let mut form = form?;
    let mut student_name = None;
    let mut roll_number = None;
    let mut date = None;
    let mut reason = None;
    let mut attachment = None;

    while let Some(field) = form.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "student_name" => student_name = Some(field.text().await?),
            "roll_number" => roll_number = Some(field.text().await?),
            "date" => date = Some(field.text().await?),
            "reason" => reason = Some(field.text().await?),
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty, unnamed part when no file is picked
                if !file_name.is_empty() {
                    attachment = Some(Attachment {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            other => debug!("Ignoring form field '{}'", other),
        }
    }

    let request = NewLeaveRequest {
        student_name: required(student_name, "student_name")?,
        roll_number: required(roll_number, "roll_number")?,
        date: required(date, "date")?,
        reason: required(reason, "reason")?,
    };

    let created = leave::submit_leave_request(&state.db, &state.od_uploads, request, attachment)
        .await?;
    Ok(Json(SubmittedResponse {
        message: "OD request submitted successfully",
        request: created.into(),
    }))
}

/// `GET /od_requests`
pub async fn list_leave_requests(State(state): State<AppState>) -> Result<Json<LeaveRequestList>> {
    let requests = leave::list_leave_requests(&state.db).await?;
    Ok(Json(LeaveRequestList {
        requests: requests.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /od_requests/{id}`
pub async fn get_leave_request(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<LeaveRequestView>> {
    leave::get_leave_request(&state.db, id)
        .await
        .map(|model| Json(model.into()))
}

/// `PUT /od_requests/{id}`
pub async fn update_leave_request(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(update): JsonBody<StatusUpdate>,
) -> Result<Json<StatusUpdated>> {
    let status: LeaveStatus = update.status.parse()?;
    let updated = leave::update_leave_request_status(&state.db, id, status).await?;
    Ok(Json(StatusUpdated {
        message: format!("OD request {} successfully", updated.status.as_str()),
        request_id: updated.id,
        status: updated.status,
    }))
}
