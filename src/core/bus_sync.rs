//! Bus sync intake - Batches of BLE presence readings uploaded by drivers.
//!
//! Batches are append-only. A batch and its reading rows are written in one
//! transaction; repeated readings inside a batch are kept as sent.

use crate::{
    entities::{BleReading, BusSync, ble_reading, bus_sync},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// How many batches the history listing returns.
pub const RECENT_SYNC_LIMIT: u64 = 50;

/// Reading rows per INSERT statement. Each row binds seven values and SQLite
/// caps a statement at 32766 bound variables.
pub const READING_INSERT_CHUNK: usize = 500;

/// One student device seen by the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceReading {
    pub roll_number: String,
    pub device_name: String,
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub rssi: i32,
    pub is_online: bool,
}

/// A batch as uploaded by a driver.
#[derive(Debug, Clone)]
pub struct NewBusSync {
    pub driver_id: String,
    pub bus_route: String,
    pub timestamp: DateTime<Utc>,
    pub readings: Vec<PresenceReading>,
}

/// Appends a batch and its readings. `student_count` is the number of
/// readings received.
pub async fn record_bus_sync(db: &DatabaseConnection, batch: NewBusSync) -> Result<bus_sync::Model> {
    if batch.driver_id.trim().is_empty() {
        return Err(Error::invalid_input("driver_id cannot be empty"));
    }
    if batch.bus_route.trim().is_empty() {
        return Err(Error::invalid_input("bus_route cannot be empty"));
    }

    let student_count = i64::try_from(batch.readings.len())
        .map_err(|_| Error::invalid_input("too many readings in one batch"))?;
    let student_data = serde_json::to_value(&batch.readings)?;

    let txn = db.begin().await?;

    let sync = bus_sync::ActiveModel {
        driver_id: Set(batch.driver_id),
        bus_route: Set(batch.bus_route),
        sync_timestamp: Set(batch.timestamp),
        student_count: Set(student_count),
        student_data: Set(student_data),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for chunk in batch.readings.chunks(READING_INSERT_CHUNK) {
        let rows = chunk.iter().map(|reading| ble_reading::ActiveModel {
            bus_sync_id: Set(sync.id),
            roll_number: Set(reading.roll_number.clone()),
            device_name: Set(reading.device_name.clone()),
            device_id: Set(reading.device_id.clone()),
            timestamp: Set(reading.timestamp),
            rssi: Set(reading.rssi),
            is_online: Set(reading.is_online),
            ..Default::default()
        });
        BleReading::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;

    info!(
        "Bus sync {} recorded: driver {} route {} with {} readings",
        sync.id, sync.driver_id, sync.bus_route, sync.student_count
    );
    Ok(sync)
}

/// Most recent batches by sync time, newest first.
pub async fn list_recent_bus_syncs(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<bus_sync::Model>> {
    BusSync::find()
        .order_by_desc(bus_sync::Column::SyncTimestamp)
        .order_by_desc(bus_sync::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Readings stored for batch `sync_id`, in arrival order.
pub async fn get_sync_readings(
    db: &DatabaseConnection,
    sync_id: i64,
) -> Result<Vec<ble_reading::Model>> {
    if BusSync::find_by_id(sync_id).one(db).await?.is_none() {
        return Err(Error::BusSyncNotFound { id: sync_id });
    }

    BleReading::find()
        .filter(ble_reading::Column::BusSyncId.eq(sync_id))
        .order_by_asc(ble_reading::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_record_counts_readings_and_keeps_duplicates() -> Result<()> {
        let db = setup_test_db().await?;
        let reading = test_reading("21CS042");
        let batch = test_bus_sync(vec![reading.clone(), reading, test_reading("21CS043")]);

        let sync = record_bus_sync(&db, batch).await?;
        assert_eq!(sync.student_count, 3);
        assert_eq!(sync.student_data.as_array().unwrap().len(), 3);

        let readings = get_sync_readings(&db, sync.id).await?;
        let rolls: Vec<&str> = readings.iter().map(|r| r.roll_number.as_str()).collect();
        assert_eq!(rolls, vec!["21CS042", "21CS042", "21CS043"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_batch_larger_than_one_statement() -> Result<()> {
        let db = setup_test_db().await?;
        let count = 5_001;
        let readings = (0..count)
            .map(|i| test_reading(&format!("R{i}")))
            .collect();

        let sync = record_bus_sync(&db, test_bus_sync(readings)).await?;
        assert_eq!(sync.student_count, 5_001);

        let stored = get_sync_readings(&db, sync.id).await?;
        assert_eq!(stored.len(), count);
        assert_eq!(stored[0].roll_number, "R0");
        assert_eq!(stored[count - 1].roll_number, "R5000");
        Ok(())
    }

    #[tokio::test]
    async fn test_record_empty_batch() -> Result<()> {
        let db = setup_test_db().await?;
        let sync = record_bus_sync(&db, test_bus_sync(Vec::new())).await?;

        assert_eq!(sync.student_count, 0);
        assert!(get_sync_readings(&db, sync.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_record_requires_driver_and_route() -> Result<()> {
        let db = setup_test_db().await?;
        let mut batch = test_bus_sync(Vec::new());
        batch.driver_id = String::new();

        let result = record_bus_sync(&db, batch).await;
        assert!(matches!(result, Err(Error::InvalidInput { message: _ })));
        assert_eq!(BusSync::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_history_newest_first_and_limited() -> Result<()> {
        let db = setup_test_db().await?;
        let base = test_bus_sync(Vec::new()).timestamp;
        for offset in [2, 0, 1] {
            let mut batch = test_bus_sync(Vec::new());
            batch.timestamp = base + Duration::minutes(offset);
            batch.bus_route = format!("route-{offset}");
            record_bus_sync(&db, batch).await?;
        }

        let recent = list_recent_bus_syncs(&db, RECENT_SYNC_LIMIT).await?;
        let routes: Vec<&str> = recent.iter().map(|s| s.bus_route.as_str()).collect();
        assert_eq!(routes, vec!["route-2", "route-1", "route-0"]);

        let limited = list_recent_bus_syncs(&db, 2).await?;
        assert_eq!(limited.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_readings_for_unknown_batch() -> Result<()> {
        let db = setup_test_db().await?;
        let result = get_sync_readings(&db, 42).await;
        assert!(matches!(result, Err(Error::BusSyncNotFound { id: 42 })));
        Ok(())
    }
}
