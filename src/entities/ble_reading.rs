//! BLE reading entity - A single student device sighting within a bus sync batch.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// BLE reading database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ble_readings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Batch this reading arrived in
    pub bus_sync_id: i64,
    pub roll_number: String,
    pub device_name: String,
    pub device_id: String,
    /// When the device was seen
    pub timestamp: DateTimeUtc,
    /// Received signal strength in dBm
    pub rssi: i32,
    pub is_online: bool,
}

/// Defines relationships between `BleReading` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reading belongs to one batch
    #[sea_orm(
        belongs_to = "super::bus_sync::Entity",
        from = "Column::BusSyncId",
        to = "super::bus_sync::Column::Id"
    )]
    BusSync,
}

impl Related<super::bus_sync::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BusSync.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
