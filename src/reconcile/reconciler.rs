use chrono::{NaiveDate, NaiveTime};
use tracing::{info, instrument, warn};

use super::clock::Clock;
use super::error::AttendanceError;
use super::locator::{DayKey, locate};
use super::locks::KeyLocks;
use super::merge::Upsert;
use super::status::{AttendanceStatus, check};
use super::store::{AttendanceStore, Directory, StoreError};
use super::validator::validate;
use crate::model::attendance::AttendanceRecord;

pub struct Reconciler<S, C> {
    store: S,
    clock: C,
    locks: KeyLocks,
}

impl<S, C> Reconciler<S, C>
where
    S: Directory + AttendanceStore,
    C: Clock,
{
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            locks: KeyLocks::default(),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Explicit attendance write. Missing day means today, missing status
    /// means Present, missing times leave stored ones alone.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        worker_id: &str,
        assignment_id: u64,
        day: Option<NaiveDate>,
        status: Option<&str>,
        entry_time: Option<NaiveTime>,
        exit_time: Option<NaiveTime>,
    ) -> Result<AttendanceRecord, AttendanceError> {
        validate(&self.store, worker_id, assignment_id).await?;

        let status = match status {
            Some(raw) => check(raw)?,
            None => AttendanceStatus::default(),
        };
        let day = day.unwrap_or_else(|| self.clock.today());
        let key = DayKey::new(worker_id, assignment_id, day);

        self.reconcile(Upsert::set_status(key, status, entry_time, exit_time))
            .await
    }

    /// Check-in for today at the current time.
    #[instrument(skip(self))]
    pub async fn mark_entry(
        &self,
        worker_id: &str,
        assignment_id: u64,
    ) -> Result<AttendanceRecord, AttendanceError> {
        validate(&self.store, worker_id, assignment_id).await?;

        let now = self.clock.now();
        let key = DayKey::new(worker_id, assignment_id, now.date());
        self.reconcile(Upsert::check_in(key, now.time())).await
    }

    /// Check-out for today at the current time.
    #[instrument(skip(self))]
    pub async fn mark_exit(
        &self,
        worker_id: &str,
        assignment_id: u64,
    ) -> Result<AttendanceRecord, AttendanceError> {
        validate(&self.store, worker_id, assignment_id).await?;

        let now = self.clock.now();
        let key = DayKey::new(worker_id, assignment_id, now.date());
        self.reconcile(Upsert::check_out(key, now.time())).await
    }

    /// Locate, then create or merge, all under the day key's lock.
    async fn reconcile(&self, upsert: Upsert) -> Result<AttendanceRecord, AttendanceError> {
        let _guard = self.locks.acquire(upsert.key().clone()).await;

        if let Some(current) = locate(&self.store, upsert.key()).await? {
            let merged = self.store.merge(&current, &upsert.merge).await?;
            info!(record_id = merged.id, status = %merged.status, "Attendance merged");
            return Ok(merged);
        }

        match self.store.insert(&upsert.create).await {
            Ok(created) => {
                info!(record_id = created.id, status = %created.status, "Attendance created");
                Ok(created)
            }
            Err(StoreError::Duplicate) => {
                // Another process created the day's record after our locate.
                warn!("Attendance record created concurrently, merging instead");
                let current = locate(&self.store, upsert.key())
                    .await?
                    .ok_or(StoreError::Duplicate)?;
                Ok(self.store.merge(&current, &upsert.merge).await?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::clock::FixedClock;
    use crate::reconcile::memory::MemoryStore;
    use crate::reconcile::merge::NewAttendance;
    use futures::future::join_all;

    fn may_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// W1 owns A1 (id 1), W3 owns A2 (id 2), W2 owns nothing.
    fn reconciler(hour: u32, minute: u32) -> Reconciler<MemoryStore, FixedClock> {
        let store = MemoryStore::default()
            .with_worker("W1")
            .with_worker("W2")
            .with_worker("W3")
            .with_assignment(1, "W1")
            .with_assignment(2, "W3");
        Reconciler::new(store, FixedClock::at(may_first(), hour, minute))
    }

    #[tokio::test]
    async fn check_in_check_out_then_justify_keeps_times() {
        let r = reconciler(8, 0);

        let entered = r.mark_entry("W1", 1).await.unwrap();
        assert_eq!(entered.day, may_first());
        assert_eq!(entered.status, AttendanceStatus::Present);
        assert_eq!(entered.entry_time, Some(t(8, 0)));
        assert_eq!(entered.exit_time, None);

        r.clock.set(17, 0);
        let exited = r.mark_exit("W1", 1).await.unwrap();
        assert_eq!(exited.id, entered.id);
        assert_eq!(exited.entry_time, Some(t(8, 0)));
        assert_eq!(exited.exit_time, Some(t(17, 0)));

        let justified = r
            .set_status("W1", 1, None, Some("Justified"), None, None)
            .await
            .unwrap();
        assert_eq!(justified.id, entered.id);
        assert_eq!(justified.status, AttendanceStatus::Justified);
        assert_eq!(justified.entry_time, Some(t(8, 0)));
        assert_eq!(justified.exit_time, Some(t(17, 0)));

        assert_eq!(r.store.records().len(), 1);
    }

    #[tokio::test]
    async fn foreign_assignment_conflicts_for_every_operation() {
        let r = reconciler(8, 0);

        let results = [
            r.mark_entry("W2", 1).await,
            r.mark_exit("W2", 1).await,
            r.set_status("W2", 1, None, Some("Present"), None, None).await,
        ];
        for result in results {
            assert!(matches!(
                result,
                Err(AttendanceError::OwnershipConflict { assignment_id: 1, .. })
            ));
        }
        assert_eq!(r.store.count(&DayKey::new("W2", 1, may_first())), 0);
        assert_eq!(r.store.writes(), 0);
    }

    #[tokio::test]
    async fn unsupported_status_changes_nothing() {
        let r = reconciler(8, 0);
        r.mark_entry("W1", 1).await.unwrap();
        let before = r.store.records();

        let err = r
            .set_status("W1", 1, None, Some("Late"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidStatus(ref s) if s == "Late"));

        let err = r
            .set_status("W1", 1, None, Some("present"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidStatus(_)));

        assert_eq!(r.store.records(), before);
        assert_eq!(r.store.writes(), 1);
    }

    #[tokio::test]
    async fn unknown_references_are_not_found() {
        let r = reconciler(8, 0);
        assert!(matches!(
            r.mark_entry("W9", 1).await,
            Err(AttendanceError::WorkerNotFound(_))
        ));
        assert!(matches!(
            r.mark_exit("W1", 99).await,
            Err(AttendanceError::AssignmentNotFound(99))
        ));
        assert!(r.store.records().is_empty());
    }

    #[tokio::test]
    async fn reference_check_runs_before_status_check() {
        let r = reconciler(8, 0);
        let err = r
            .set_status("W2", 1, None, Some("Late"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::OwnershipConflict { .. }));
    }

    #[tokio::test]
    async fn check_out_without_check_in_back_fills_entry() {
        let r = reconciler(9, 30);
        let record = r.mark_exit("W3", 2).await.unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.entry_time, Some(t(9, 30)));
        assert_eq!(record.exit_time, Some(t(9, 30)));
    }

    #[tokio::test]
    async fn second_check_in_overwrites_entry_time() {
        let r = reconciler(8, 0);
        r.mark_entry("W1", 1).await.unwrap();
        r.clock.set(8, 45);
        let record = r.mark_entry("W1", 1).await.unwrap();

        assert_eq!(record.entry_time, Some(t(8, 45)));
        assert_eq!(r.store.count(&DayKey::new("W1", 1, may_first())), 1);
    }

    #[tokio::test]
    async fn check_in_after_absence_restores_present_and_keeps_exit() {
        let r = reconciler(8, 0);
        r.set_status("W1", 1, None, Some("Absent"), None, Some(t(12, 0)))
            .await
            .unwrap();

        r.clock.set(13, 0);
        let record = r.mark_entry("W1", 1).await.unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.entry_time, Some(t(13, 0)));
        assert_eq!(record.exit_time, Some(t(12, 0)));
    }

    #[tokio::test]
    async fn set_status_defaults_to_present_today() {
        let r = reconciler(10, 0);
        let record = r.set_status("W1", 1, None, None, None, None).await.unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.day, may_first());
        assert_eq!(record.entry_time, None);
        assert_eq!(record.exit_time, None);
    }

    #[tokio::test]
    async fn set_status_for_another_day_is_a_separate_record() {
        let r = reconciler(10, 0);
        r.mark_entry("W1", 1).await.unwrap();

        let earlier = NaiveDate::from_ymd_opt(2024, 4, 30);
        let record = r
            .set_status("W1", 1, earlier, Some("Absent"), None, None)
            .await
            .unwrap();

        assert_eq!(record.day, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        assert_eq!(r.store.records().len(), 2);
    }

    #[tokio::test]
    async fn set_status_replaces_only_supplied_times() {
        let r = reconciler(8, 0);
        r.mark_entry("W1", 1).await.unwrap();
        r.clock.set(17, 0);
        r.mark_exit("W1", 1).await.unwrap();

        let record = r
            .set_status("W1", 1, None, Some("Present"), None, Some(t(16, 30)))
            .await
            .unwrap();

        assert_eq!(record.entry_time, Some(t(8, 0)));
        assert_eq!(record.exit_time, Some(t(16, 30)));
    }

    #[tokio::test]
    async fn concurrent_calls_on_one_key_leave_one_record() {
        let r = reconciler(8, 0);

        let calls = (0..16).map(|i| {
            let r = &r;
            async move {
                if i % 2 == 0 {
                    r.mark_entry("W1", 1).await
                } else {
                    r.mark_exit("W1", 1).await
                }
            }
        });
        for result in join_all(calls).await {
            result.unwrap();
        }

        assert_eq!(r.store.count(&DayKey::new("W1", 1, may_first())), 1);
    }

    #[tokio::test]
    async fn lost_insert_race_is_merged_into_the_winner() {
        let r = reconciler(17, 0);
        r.store.race_next_insert(NewAttendance {
            key: DayKey::new("W1", 1, may_first()),
            status: AttendanceStatus::Present,
            entry_time: Some(t(8, 0)),
            exit_time: None,
        });

        let record = r.mark_exit("W1", 1).await.unwrap();
        assert_eq!(record.entry_time, Some(t(8, 0)));
        assert_eq!(record.exit_time, Some(t(17, 0)));
        assert_eq!(r.store.count(&DayKey::new("W1", 1, may_first())), 1);
    }
}
