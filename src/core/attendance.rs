//! Attendance ledger - Marking and reading daily attendance.
//!
//! A record is keyed by (student, class, date). Marking is a single
//! `INSERT ... ON CONFLICT DO UPDATE` against the `uq_attendance` index, so
//! concurrent marks for the same key leave exactly one row holding the last
//! status written.

use crate::{
    core::roster,
    entities::{Attendance, AttendanceStatus, Student, attendance},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use serde::Serialize;
use tracing::debug;

/// One line of a class register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceEntry {
    pub student_name: String,
    pub class_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Records `status` for a student in a class on `date`.
///
/// Both names must already exist and be linked by an enrollment. An existing
/// record for the same day is overwritten.
pub async fn mark_attendance(
    db: &DatabaseConnection,
    student_name: &str,
    class_name: &str,
    date: NaiveDate,
    status: AttendanceStatus,
) -> Result<attendance::Model> {
    let txn = db.begin().await?;

    let student = roster::get_student_by_name(&txn, student_name)
        .await?
        .ok_or_else(|| Error::StudentNotFound {
            name: student_name.to_string(),
        })?;
    let class = roster::get_class_by_name(&txn, class_name)
        .await?
        .ok_or_else(|| Error::ClassNotFound {
            name: class_name.to_string(),
        })?;

    if !roster::is_enrolled(&txn, student.id, class.id).await? {
        return Err(Error::NotEnrolled {
            student: student_name.to_string(),
            class: class_name.to_string(),
        });
    }

    Attendance::insert(attendance::ActiveModel {
        student_id: Set(student.id),
        class_id: Set(class.id),
        date: Set(date),
        status: Set(status),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([
            attendance::Column::StudentId,
            attendance::Column::ClassId,
            attendance::Column::Date,
        ])
        .update_column(attendance::Column::Status)
        .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;

    let record = Attendance::find()
        .filter(attendance::Column::StudentId.eq(student.id))
        .filter(attendance::Column::ClassId.eq(class.id))
        .filter(attendance::Column::Date.eq(date))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            Error::Database(DbErr::RecordNotFound(format!(
                "attendance for student {} class {} on {date} missing after upsert",
                student.id, class.id
            )))
        })?;

    txn.commit().await?;

    debug!(
        "Marked student {} {} in class {} on {}",
        student.id,
        status.as_str(),
        class.id,
        date
    );
    Ok(record)
}

/// Lists every record for `class_name` on `date`, ordered by student id.
///
/// An existing class with nothing marked yields an empty list.
pub async fn get_class_attendance(
    db: &DatabaseConnection,
    class_name: &str,
    date: NaiveDate,
) -> Result<Vec<AttendanceEntry>> {
    let class = roster::get_class_by_name(db, class_name)
        .await?
        .ok_or_else(|| Error::ClassNotFound {
            name: class_name.to_string(),
        })?;

    let rows = Attendance::find()
        .filter(attendance::Column::ClassId.eq(class.id))
        .filter(attendance::Column::Date.eq(date))
        .order_by_asc(attendance::Column::StudentId)
        .find_also_related(Student)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(record, student)| {
            student.map(|student| AttendanceEntry {
                student_name: student.name,
                class_name: class.name.clone(),
                date: record.date,
                status: record.status,
            })
        })
        .collect())
}
