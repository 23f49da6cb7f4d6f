//! Bus BLE sync routes.

use crate::{
    api::{
        AppState,
        extract::{JsonBody, PathParam},
    },
    core::bus_sync::{self, NewBusSync, PresenceReading, RECENT_SYNC_LIMIT},
    entities::ble_reading,
    errors::Result,
};
use axum::{
    Json,
    extract::State,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct BusSyncRequest {
    pub driver_id: String,
    pub bus_route: String,
    pub timestamp: DateTime<Utc>,
    pub students: Vec<PresenceReading>,
}

/// Batch summary, also used for history entries.
#[derive(Debug, Serialize)]
pub struct SyncSummary {
    pub sync_id: i64,
    pub driver_id: String,
    pub bus_route: String,
    pub student_count: i64,
    pub sync_timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SyncAccepted {
    #[serde(flatten)]
    pub summary: SyncSummary,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SyncHistory {
    pub sync_records: Vec<SyncSummary>,
}

#[derive(Debug, Serialize)]
pub struct SyncStudents {
    pub sync_id: i64,
    pub students: Vec<PresenceReading>,
}

impl From<crate::entities::bus_sync::Model> for SyncSummary {
    fn from(model: crate::entities::bus_sync::Model) -> Self {
        Self {
            sync_id: model.id,
            driver_id: model.driver_id,
            bus_route: model.bus_route,
            student_count: model.student_count,
            sync_timestamp: model.sync_timestamp,
        }
    }
}

impl From<ble_reading::Model> for PresenceReading {
    fn from(model: ble_reading::Model) -> Self {
        Self {
            roll_number: model.roll_number,
            device_name: model.device_name,
            device_id: model.device_id,
            timestamp: model.timestamp,
            rssi: model.rssi,
            is_online: model.is_online,
        }
    }
}

/// `POST /bus_sync`
pub async fn sync_bus_data(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<BusSyncRequest>,
) -> Result<Json<SyncAccepted>> {
    let sync = bus_sync::record_bus_sync(
        &state.db,
        NewBusSync {
            driver_id: request.driver_id,
            bus_route: request.bus_route,
            timestamp: request.timestamp,
            readings: request.students,
        },
    )
    .await?;

    Ok(Json(SyncAccepted {
        summary: sync.into(),
        message: "Bus data synced successfully",
    }))
}

/// `GET /bus_sync`
pub async fn bus_sync_history(State(state): State<AppState>) -> Result<Json<SyncHistory>> {
    let syncs = bus_sync::list_recent_bus_syncs(&state.db, RECENT_SYNC_LIMIT).await?;
    Ok(Json(SyncHistory {
        sync_records: syncs.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /bus_sync/{id}/students`
pub async fn bus_sync_students(
    State(state): State<AppState>,
    PathParam(sync_id): PathParam<i64>,
) -> Result<Json<SyncStudents>> {
    let readings = bus_sync::get_sync_readings(&state.db, sync_id).await?;
    Ok(Json(SyncStudents {
        sync_id,
        students: readings.into_iter().map(Into::into).collect(),
    }))
}
