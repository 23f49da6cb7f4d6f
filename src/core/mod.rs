//! Core business logic - framework-agnostic operations over the store.
//!
//! Nothing in here knows about HTTP; the `api` layer translates requests into
//! these calls and their errors into responses.

pub mod attendance;
pub mod blob;
pub mod bus_sync;
pub mod credentials;
pub mod leave;
pub mod roster;
pub mod token;
pub mod uploads;
