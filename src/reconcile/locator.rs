use chrono::NaiveDate;
use tracing::debug;

use super::store::{AttendanceStore, StoreError};
use crate::model::attendance::AttendanceRecord;

/// Natural key of an attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DayKey {
    pub worker_id: String,
    pub assignment_id: u64,
    pub day: NaiveDate,
}

impl DayKey {
    pub fn new(worker_id: impl Into<String>, assignment_id: u64, day: NaiveDate) -> Self {
        Self {
            worker_id: worker_id.into(),
            assignment_id,
            day,
        }
    }
}

/// Finds the record for `key`, if any. No range or fuzzy day matching.
pub async fn locate<S: AttendanceStore>(
    store: &S,
    key: &DayKey,
) -> Result<Option<AttendanceRecord>, StoreError> {
    let found = store.find_by_key(key).await?;
    debug!(
        worker_id = %key.worker_id,
        assignment_id = key.assignment_id,
        day = %key.day,
        found = found.is_some(),
        "Located attendance record"
    );
    Ok(found)
}
