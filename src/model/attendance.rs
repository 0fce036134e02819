use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::reconcile::locator::DayKey;
use crate::reconcile::status::AttendanceStatus;
use crate::reconcile::store::StoreError;

/// Canonical attendance for one worker on one assignment and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 42,
        "worker_id": "30111222",
        "assignment_id": 7,
        "day": "2024-05-01",
        "status": "Present",
        "entry_time": "08:00:00",
        "exit_time": "17:00:00"
    })
)]
pub struct AttendanceRecord {
    pub id: u64,
    pub worker_id: String,
    pub assignment_id: u64,
    #[schema(value_type = String, format = "date")]
    pub day: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(value_type = Option<String>, example = "08:00:00")]
    pub entry_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "17:00:00")]
    pub exit_time: Option<NaiveTime>,
}

impl AttendanceRecord {
    pub fn key(&self) -> DayKey {
        DayKey::new(self.worker_id.clone(), self.assignment_id, self.day)
    }
}

/// Raw row as stored; `status` is only trusted after it passes the status guard.
#[derive(Debug, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: u64,
    pub worker_id: String,
    pub assignment_id: u64,
    pub day: NaiveDate,
    pub status: String,
    pub entry_time: Option<NaiveTime>,
    pub exit_time: Option<NaiveTime>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<AttendanceStatus>()
            .map_err(|_| StoreError::Corrupt(row.status.clone()))?;

        Ok(AttendanceRecord {
            id: row.id,
            worker_id: row.worker_id,
            assignment_id: row.assignment_id,
            day: row.day,
            status,
            entry_time: row.entry_time,
            exit_time: row.exit_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> AttendanceRow {
        AttendanceRow {
            id: 1,
            worker_id: "W1".to_string(),
            assignment_id: 10,
            day: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            status: status.to_string(),
            entry_time: NaiveTime::from_hms_opt(8, 0, 0),
            exit_time: None,
        }
    }

    #[test]
    fn stored_row_converts_to_record() {
        let record = AttendanceRecord::try_from(row("Justified")).unwrap();
        assert_eq!(record.status, AttendanceStatus::Justified);
        assert_eq!(record.entry_time, NaiveTime::from_hms_opt(8, 0, 0));
        assert_eq!(record.key().worker_id, "W1");
    }

    #[test]
    fn unknown_stored_status_is_reported_as_corrupt() {
        match AttendanceRecord::try_from(row("present")) {
            Err(StoreError::Corrupt(value)) => assert_eq!(value, "present"),
            other => panic!("expected corrupt row, got {other:?}"),
        }
    }

    #[test]
    fn record_serializes_with_status_label() {
        let record = AttendanceRecord::try_from(row("Present")).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "Present");
        assert_eq!(json["entry_time"], "08:00:00");
        assert!(json["exit_time"].is_null());
    }
}
