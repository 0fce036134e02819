use derive_more::Display;

use super::store::StoreError;

/// Failures of the reconciliation operations. Everything except `Storage`
/// is detected before any write.
#[derive(Debug, Display)]
pub enum AttendanceError {
    #[display(fmt = "Worker {} not found", _0)]
    WorkerNotFound(String),

    #[display(fmt = "Assignment {} not found", _0)]
    AssignmentNotFound(u64),

    #[display(
        fmt = "Assignment {} does not belong to worker {}",
        assignment_id,
        worker_id
    )]
    OwnershipConflict {
        worker_id: String,
        assignment_id: u64,
    },

    #[display(
        fmt = "Invalid status {:?}. Allowed: Present, Absent, Justified",
        _0
    )]
    InvalidStatus(String),

    #[display(fmt = "Storage failure: {}", _0)]
    Storage(StoreError),
}

impl std::error::Error for AttendanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttendanceError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for AttendanceError {
    fn from(e: StoreError) -> Self {
        AttendanceError::Storage(e)
    }
}
