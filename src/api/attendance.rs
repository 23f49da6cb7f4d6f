//! Enrollment and attendance routes.

use crate::{
    api::{
        AppState, MessageResponse,
        extract::{JsonBody, QueryParams},
    },
    core::{
        attendance::{self, AttendanceEntry},
        roster,
    },
    entities::AttendanceStatus,
    errors::Result,
};
use axum::{
    Json,
    extract::State,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub student_name: String,
    pub class_name: String,
}

#[derive(Debug, Serialize)]
pub struct EnrollResponse {
    pub student_id: i64,
    pub class_id: i64,
    pub message: &'static str,
}

/// Body shared by marking and updating.
#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    pub student_name: String,
    pub class_name: String,
    pub date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ClassAttendanceQuery {
    pub class_name: String,
    pub on: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct ClassAttendanceResponse {
    pub class_name: String,
    pub records: Vec<AttendanceEntry>,
}

/// `POST /enroll`
pub async fn enroll(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<EnrollRequest>,
) -> Result<Json<EnrollResponse>> {
    let outcome = roster::enroll(&state.db, &request.student_name, &request.class_name).await?;
    Ok(Json(EnrollResponse {
        student_id: outcome.student_id,
        class_id: outcome.class_id,
        message: if outcome.created {
            "Enrolled successfully"
        } else {
            "Already enrolled"
        },
    }))
}

async fn record(state: &AppState, request: AttendanceRequest) -> Result<()> {
    let status: AttendanceStatus = request.status.parse()?;
    attendance::mark_attendance(
        &state.db,
        &request.student_name,
        &request.class_name,
        request.date,
        status,
    )
    .await?;
    Ok(())
}

/// `POST /mark_attendance`
pub async fn mark_attendance(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AttendanceRequest>,
) -> Result<Json<MessageResponse>> {
    record(&state, request).await?;
    Ok(Json(MessageResponse {
        message: "Attendance marked",
    }))
}

/// `PUT /attendance/update`
pub async fn update_attendance(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AttendanceRequest>,
) -> Result<Json<MessageResponse>> {
    record(&state, request).await?;
    Ok(Json(MessageResponse {
        message: "Attendance updated successfully",
    }))
}

/// `GET /class_attendance?class_name=..&on=YYYY-MM-DD`
pub async fn class_attendance(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ClassAttendanceQuery>,
) -> Result<Json<ClassAttendanceResponse>> {
    let records = attendance::get_class_attendance(&state.db, &query.class_name, query.on).await?;
    Ok(Json(ClassAttendanceResponse {
        class_name: query.class_name,
        records,
    }))
}
