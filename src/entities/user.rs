//! User entity - Accounts that can log in to the system.
//!
//! Each user has a unique username, an Argon2 password hash, a role and a
//! display name. Users are never hard-deleted; `is_active` gates login.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role a user acts in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A student attending classes
    #[sea_orm(string_value = "student")]
    Student,
    /// A teacher marking attendance and deciding leave requests
    #[sea_orm(string_value = "teacher")]
    Teacher,
    /// A bus driver uploading presence readings
    #[sea_orm(string_value = "driver")]
    Driver,
}

impl Role {
    /// Wire/storage name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Driver => "driver",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "driver" => Ok(Self::Driver),
            other => Err(crate::errors::Error::invalid_input(format!(
                "role must be one of student, teacher, driver (got '{other}')"
            ))),
        }
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique and case-sensitive
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string; never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role the user registered with
    pub role: Role,
    /// Human-readable display name
    pub name: String,
    /// Inactive users cannot log in
    pub is_active: bool,
    /// When the account was registered
    pub created_at: DateTimeUtc,
}

/// Users are not linked to roster entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
