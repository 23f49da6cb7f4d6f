//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod attendance;
pub mod ble_reading;
pub mod bus_sync;
pub mod class;
pub mod enrollment;
pub mod leave_request;
pub mod student;
pub mod user;

// Re-export specific types to avoid conflicts
pub use attendance::{
    AttendanceStatus, Column as AttendanceColumn, Entity as Attendance, Model as AttendanceModel,
};
pub use ble_reading::{Column as BleReadingColumn, Entity as BleReading, Model as BleReadingModel};
pub use bus_sync::{Column as BusSyncColumn, Entity as BusSync, Model as BusSyncModel};
pub use class::{Column as ClassColumn, Entity as Class, Model as ClassModel};
pub use enrollment::{Column as EnrollmentColumn, Entity as Enrollment, Model as EnrollmentModel};
pub use leave_request::{
    Column as LeaveRequestColumn, Entity as LeaveRequest, LeaveStatus, Model as LeaveRequestModel,
};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
