//! Attendance reconciliation.
//!
//! Check-in, check-out and explicit status calls arrive repeatedly and in any
//! order; this module folds them into one record per worker, assignment and
//! day. Every operation validates the worker/assignment pair first, then runs
//! locate → create-or-merge for the day key while holding that key's lock.

pub mod clock;
pub mod error;
pub mod locator;
pub mod locks;
pub mod merge;
pub mod mysql;
pub mod reconciler;
pub mod status;
pub mod store;
pub mod validator;

#[cfg(test)]
pub mod memory;

pub use clock::{Clock, SystemClock};
pub use error::AttendanceError;
pub use mysql::MySqlStore;
pub use reconciler::Reconciler;
pub use status::AttendanceStatus;
pub use store::{AttendanceStore, Directory};

/// The reconciler as wired into the HTTP layer.
pub type AttendanceService = Reconciler<MySqlStore, SystemClock>;
