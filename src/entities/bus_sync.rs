//! Bus sync entity - One batch of BLE presence readings uploaded by a driver.
//!
//! The batch keeps its readings embedded as JSON and each reading is also
//! stored as a [`super::ble_reading`] row. Batches are append-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bus sync database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bus_syncs")]
pub struct Model {
    /// Unique identifier for the batch
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Driver who uploaded the batch
    pub driver_id: String,
    /// Route the bus was running
    pub bus_route: String,
    /// Time the driver's device performed the sync
    pub sync_timestamp: DateTimeUtc,
    /// Number of readings in the batch at ingestion time
    pub student_count: i64,
    /// Readings as received, serialized to JSON
    pub student_data: Json,
}

/// Defines relationships between `BusSync` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One batch has many readings
    #[sea_orm(has_many = "super::ble_reading::Entity")]
    Readings,
}

impl Related<super::ble_reading::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Readings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
