use derive_more::Display;

use super::locator::DayKey;
use super::merge::{AttendancePatch, NewAttendance};
use crate::db::is_duplicate_key;
use crate::model::assignment::Assignment;
use crate::model::attendance::AttendanceRecord;

#[derive(Debug, Display)]
pub enum StoreError {
    /// A record for the day key already exists.
    #[display(fmt = "Attendance record already exists for this day")]
    Duplicate,

    /// A stored status outside the enumeration.
    #[display(fmt = "Stored attendance status {:?} is not recognized", _0)]
    Corrupt(String),

    #[display(fmt = "Database error: {}", _0)]
    Database(sqlx::Error),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if is_duplicate_key(&e) {
            StoreError::Duplicate
        } else {
            StoreError::Database(e)
        }
    }
}

/// Read-only lookups of the externally owned worker and assignment entities.
pub trait Directory {
    async fn worker_exists(&self, worker_id: &str) -> Result<bool, StoreError>;

    async fn get_assignment(&self, assignment_id: u64) -> Result<Option<Assignment>, StoreError>;
}

/// Persistence of attendance records.
pub trait AttendanceStore {
    /// Exact match on worker, assignment and day.
    async fn find_by_key(&self, key: &DayKey) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Creates a record; `StoreError::Duplicate` if the day key is taken.
    async fn insert(&self, draft: &NewAttendance) -> Result<AttendanceRecord, StoreError>;

    /// Applies `patch` to the stored `current` record and returns the result.
    /// Fields the patch keeps are not written.
    async fn merge(
        &self,
        current: &AttendanceRecord,
        patch: &AttendancePatch,
    ) -> Result<AttendanceRecord, StoreError>;
}
