//! Roster business logic - Students, classes and enrollments.
//!
//! Students and classes are found or created by name. Creation goes through
//! `INSERT ... ON CONFLICT DO NOTHING` against the unique name columns followed
//! by a lookup, so two concurrent enrollments can never create duplicates.

use crate::{
    entities::{Class, Enrollment, Student, class, enrollment, student},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use serde::Serialize;
use tracing::info;

/// Result of an enroll call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnrollOutcome {
    pub student_id: i64,
    pub class_id: i64,
    /// `false` when the pair was already enrolled and nothing changed
    pub created: bool,
}

fn require_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_input(format!("{kind} name cannot be empty")));
    }
    Ok(())
}

/// Finds a student by exact name.
pub async fn get_student_by_name<C>(db: &C, name: &str) -> Result<Option<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find()
        .filter(student::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a class by exact name.
pub async fn get_class_by_name<C>(db: &C, name: &str) -> Result<Option<class::Model>>
where
    C: ConnectionTrait,
{
    Class::find()
        .filter(class::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the student called `name`, inserting it first if needed.
pub async fn find_or_create_student<C>(db: &C, name: &str) -> Result<student::Model>
where
    C: ConnectionTrait,
{
    Student::insert(student::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::column(student::Column::Name)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;

    get_student_by_name(db, name)
        .await?
        .ok_or_else(|| Error::StudentNotFound {
            name: name.to_string(),
        })
}

/// Returns the class called `name`, inserting it first if needed.
pub async fn find_or_create_class<C>(db: &C, name: &str) -> Result<class::Model>
where
    C: ConnectionTrait,
{
    Class::insert(class::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    })
    .on_conflict(OnConflict::column(class::Column::Name).do_nothing().to_owned())
    .exec_without_returning(db)
    .await?;

    get_class_by_name(db, name)
        .await?
        .ok_or_else(|| Error::ClassNotFound {
            name: name.to_string(),
        })
}

/// Enrolls `student_name` in `class_name`, creating either if missing.
///
/// Everything happens in one transaction. Enrolling an already-enrolled pair
/// is not an error; it reports `created: false` and leaves the store as is.
pub async fn enroll(
    db: &DatabaseConnection,
    student_name: &str,
    class_name: &str,
) -> Result<EnrollOutcome> {
    require_name("student", student_name)?;
    require_name("class", class_name)?;

    let txn = db.begin().await?;

    let student = find_or_create_student(&txn, student_name).await?;
    let class = find_or_create_class(&txn, class_name).await?;

    let inserted = Enrollment::insert(enrollment::ActiveModel {
        student_id: Set(student.id),
        class_id: Set(class.id),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([
            enrollment::Column::StudentId,
            enrollment::Column::ClassId,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;

    txn.commit().await?;

    let created = inserted > 0;
    if created {
        info!("Enrolled student {} in class {}", student.id, class.id);
    }

    Ok(EnrollOutcome {
        student_id: student.id,
        class_id: class.id,
        created,
    })
}

/// Whether an enrollment links the two ids.
pub async fn is_enrolled<C>(db: &C, student_id: i64, class_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = Enrollment::find()
        .filter(enrollment::Column::StudentId.eq(student_id))
        .filter(enrollment::Column::ClassId.eq(class_id))
        .count(db)
        .await?;
    Ok(count > 0)
}
