use tracing::warn;

use super::error::AttendanceError;
use super::store::Directory;
use crate::model::assignment::Assignment;

/// Confirms the worker and assignment exist and that the assignment is owned
/// by that worker. Pure read.
pub async fn validate<D: Directory>(
    directory: &D,
    worker_id: &str,
    assignment_id: u64,
) -> Result<Assignment, AttendanceError> {
    if !directory.worker_exists(worker_id).await? {
        return Err(AttendanceError::WorkerNotFound(worker_id.to_string()));
    }

    let assignment = directory
        .get_assignment(assignment_id)
        .await?
        .ok_or(AttendanceError::AssignmentNotFound(assignment_id))?;

    if assignment.worker_dni != worker_id {
        warn!(
            worker_id,
            assignment_id,
            owner = %assignment.worker_dni,
            "Assignment belongs to another worker"
        );
        return Err(AttendanceError::OwnershipConflict {
            worker_id: worker_id.to_string(),
            assignment_id,
        });
    }

    Ok(assignment)
}
