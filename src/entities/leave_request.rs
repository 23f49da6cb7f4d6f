//! Leave request entity - "On-duty" (OD) requests submitted by students.
//!
//! Fields are stored verbatim as submitted. Status starts at `pending` and is
//! later set to `approved` or `rejected` by staff.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision state of a leave request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl LeaveStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for LeaveStatus {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(crate::errors::Error::invalid_input(format!(
                "unknown OD request status '{other}'"
            ))),
        }
    }
}

/// Leave request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "od_requests")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_name: String,
    pub roll_number: String,
    /// Day the leave is requested for, exactly as submitted
    pub date: String,
    pub reason: String,
    /// Stored attachment name in the OD upload directory, if any
    pub file_name: Option<String>,
    pub status: LeaveStatus,
    /// When the request was submitted
    pub created_at: DateTimeUtc,
}

/// Leave requests have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
