//! In-memory store for exercising the reconciler without MySQL.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::NaiveDate;

use super::locator::DayKey;
use super::merge::{AttendancePatch, NewAttendance};
use super::store::{AttendanceStore, Directory, StoreError};
use crate::model::assignment::Assignment;
use crate::model::attendance::AttendanceRecord;

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    workers: HashSet<String>,
    assignments: HashMap<u64, Assignment>,
    records: Vec<AttendanceRecord>,
    next_id: u64,
    writes: usize,
    rival_insert: Option<NewAttendance>,
}

impl State {
    fn push(&mut self, draft: NewAttendance) -> AttendanceRecord {
        self.next_id += 1;
        let record = draft.into_record(self.next_id);
        self.records.push(record.clone());
        record
    }
}

impl MemoryStore {
    pub fn with_worker(self, dni: &str) -> Self {
        self.state.lock().unwrap().workers.insert(dni.to_string());
        self
    }

    pub fn with_assignment(self, id: u64, owner: &str) -> Self {
        self.state.lock().unwrap().assignments.insert(
            id,
            Assignment {
                id,
                work_id: 1,
                worker_dni: owner.to_string(),
                employee_role: "Bricklayer".to_string(),
                assigned_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                active: true,
            },
        );
        self
    }

    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn count(&self, key: &DayKey) -> usize {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|r| r.key() == *key)
            .count()
    }

    /// Number of successful inserts and merges.
    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    /// Simulates another process winning the race: the next insert first
    /// stores `rival`, then proceeds (and hits the unique key).
    pub fn race_next_insert(&self, rival: NewAttendance) {
        self.state.lock().unwrap().rival_insert = Some(rival);
    }
}

impl Directory for MemoryStore {
    async fn worker_exists(&self, worker_id: &str) -> Result<bool, StoreError> {
        tokio::task::yield_now().await;
        Ok(self.state.lock().unwrap().workers.contains(worker_id))
    }

    async fn get_assignment(&self, assignment_id: u64) -> Result<Option<Assignment>, StoreError> {
        tokio::task::yield_now().await;
        Ok(self
            .state
            .lock()
            .unwrap()
            .assignments
            .get(&assignment_id)
            .cloned())
    }
}

impl AttendanceStore for MemoryStore {
    async fn find_by_key(&self, key: &DayKey) -> Result<Option<AttendanceRecord>, StoreError> {
        // Yield so concurrent callers interleave between locate and write.
        tokio::task::yield_now().await;
        Ok(self
            .state
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r.key() == *key)
            .cloned())
    }

    async fn insert(&self, draft: &NewAttendance) -> Result<AttendanceRecord, StoreError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        if let Some(rival) = state.rival_insert.take() {
            state.push(rival);
        }
        if state.records.iter().any(|r| r.key() == draft.key) {
            return Err(StoreError::Duplicate);
        }
        state.writes += 1;
        Ok(state.push(draft.clone()))
    }

    async fn merge(
        &self,
        current: &AttendanceRecord,
        patch: &AttendancePatch,
    ) -> Result<AttendanceRecord, StoreError> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        let stored = state
            .records
            .iter_mut()
            .find(|r| r.id == current.id)
            .ok_or_else(|| StoreError::Database(sqlx::Error::RowNotFound))?;
        patch.apply(stored);
        let merged = stored.clone();
        state.writes += 1;
        Ok(merged)
    }
}
