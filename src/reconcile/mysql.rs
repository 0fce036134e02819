use sqlx::MySqlPool;

use super::locator::DayKey;
use super::merge::{AttendancePatch, FieldUpdate, NewAttendance};
use super::store::{AttendanceStore, Directory, StoreError};
use crate::model::assignment::Assignment;
use crate::model::attendance::{AttendanceRecord, AttendanceRow};

const SELECT_ATTENDANCE: &str = r#"
    SELECT id, worker_id, assignment_id, day, status, entry_time, exit_time
    FROM attendance
"#;

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl Directory for MySqlStore {
    async fn worker_exists(&self, worker_id: &str) -> Result<bool, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM workers WHERE dni = ?")
            .bind(worker_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn get_assignment(&self, assignment_id: u64) -> Result<Option<Assignment>, StoreError> {
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, work_id, worker_dni, employee_role, assigned_on, active
            FROM assignments
            WHERE id = ?
            "#,
        )
        .bind(assignment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(assignment)
    }
}

impl AttendanceStore for MySqlStore {
    async fn find_by_key(&self, key: &DayKey) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!(
            "{SELECT_ATTENDANCE} WHERE worker_id = ? AND assignment_id = ? AND day = ?"
        );
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(&key.worker_id)
            .bind(key.assignment_id)
            .bind(key.day)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AttendanceRecord::try_from).transpose()
    }

    async fn insert(&self, draft: &NewAttendance) -> Result<AttendanceRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance
                (worker_id, assignment_id, day, status, entry_time, exit_time)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.key.worker_id)
        .bind(draft.key.assignment_id)
        .bind(draft.key.day)
        .bind(draft.status.as_str())
        .bind(draft.entry_time)
        .bind(draft.exit_time)
        .execute(&self.pool)
        .await?;

        Ok(draft.clone().into_record(result.last_insert_id()))
    }

    async fn merge(
        &self,
        current: &AttendanceRecord,
        patch: &AttendancePatch,
    ) -> Result<AttendanceRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        if !patch.is_empty() {
            // Only the columns the patch sets are written, so concurrent
            // merges from other processes keep their own fields.
            let mut assignments = Vec::with_capacity(3);
            if patch.status.is_set() {
                assignments.push("status = ?");
            }
            if patch.entry_time.is_set() {
                assignments.push("entry_time = ?");
            }
            if patch.exit_time.is_set() {
                assignments.push("exit_time = ?");
            }
            let sql = format!(
                "UPDATE attendance SET {} WHERE id = ?",
                assignments.join(", ")
            );

            let mut query = sqlx::query(&sql);
            if let FieldUpdate::Set(status) = patch.status {
                query = query.bind(status.as_str());
            }
            if let FieldUpdate::Set(entry) = patch.entry_time {
                query = query.bind(entry);
            }
            if let FieldUpdate::Set(exit) = patch.exit_time {
                query = query.bind(exit);
            }
            query.bind(current.id).execute(&mut *tx).await?;
        }

        let sql = format!("{SELECT_ATTENDANCE} WHERE id = ?");
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(current.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        AttendanceRecord::try_from(row)
    }
}
