//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs. Composite uniqueness that entities cannot express is added as
//! explicit indexes; the upserts in [`crate::core`] rely on them.

use crate::entities::{
    Attendance, AttendanceColumn, BleReading, BusSync, Class, Enrollment, EnrollmentColumn,
    LeaveRequest, Student, User,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use tracing::{debug, info};

/// Name of the unique index over enrollments(student_id, class_id).
pub const ENROLLMENT_UNIQUE_INDEX: &str = "uq_student_class";

/// Name of the unique index over attendance(student_id, class_id, date).
pub const ATTENDANCE_UNIQUE_INDEX: &str = "uq_attendance";

/// Opens a connection pool to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables and unique indexes if they do not exist yet.
///
/// Safe to call on every start-up.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Student).await?;
    create_table(db, &schema, Class).await?;
    create_table(db, &schema, Enrollment).await?;
    create_table(db, &schema, Attendance).await?;
    create_table(db, &schema, LeaveRequest).await?;
    create_table(db, &schema, BusSync).await?;
    create_table(db, &schema, BleReading).await?;

    let enrollment_unique = Index::create()
        .name(ENROLLMENT_UNIQUE_INDEX)
        .table(Enrollment)
        .col(EnrollmentColumn::StudentId)
        .col(EnrollmentColumn::ClassId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&enrollment_unique)).await?;

    let attendance_unique = Index::create()
        .name(ATTENDANCE_UNIQUE_INDEX)
        .table(Attendance)
        .col(AttendanceColumn::StudentId)
        .col(AttendanceColumn::ClassId)
        .col(AttendanceColumn::Date)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&attendance_unique)).await?;

    info!("Database schema ensured");
    Ok(())
}
