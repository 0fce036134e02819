//! Per-operation merge policies.
//!
//! Each reconciliation operation is described by an [`Upsert`]: the record to
//! create when the day key is empty, and the patch to apply when it is not.
//! A patch names every field explicitly as either kept or set, so a merge can
//! never clear an entry or exit time by omission.

use chrono::NaiveTime;

use super::locator::DayKey;
use super::status::AttendanceStatus;
use crate::model::attendance::AttendanceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Keep,
    Set(T),
}

impl<T> FieldUpdate<T> {
    /// `Set` when the caller supplied a value, `Keep` otherwise.
    pub fn provided(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldUpdate::Set(v),
            None => FieldUpdate::Keep,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            FieldUpdate::Keep => FieldUpdate::Keep,
            FieldUpdate::Set(v) => FieldUpdate::Set(f(v)),
        }
    }

    pub fn write(self, slot: &mut T) {
        if let FieldUpdate::Set(v) = self {
            *slot = v;
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, FieldUpdate::Set(_))
    }
}

/// Changes applied to an existing record. Identity and key fields are never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendancePatch {
    pub status: FieldUpdate<AttendanceStatus>,
    pub entry_time: FieldUpdate<NaiveTime>,
    pub exit_time: FieldUpdate<NaiveTime>,
}

impl AttendancePatch {
    pub fn apply(&self, record: &mut AttendanceRecord) {
        self.status.write(&mut record.status);
        self.entry_time.map(Some).write(&mut record.entry_time);
        self.exit_time.map(Some).write(&mut record.exit_time);
    }

    pub fn is_empty(&self) -> bool {
        !self.status.is_set() && !self.entry_time.is_set() && !self.exit_time.is_set()
    }
}

/// A record that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub key: DayKey,
    pub status: AttendanceStatus,
    pub entry_time: Option<NaiveTime>,
    pub exit_time: Option<NaiveTime>,
}

impl NewAttendance {
    pub fn into_record(self, id: u64) -> AttendanceRecord {
        AttendanceRecord {
            id,
            worker_id: self.key.worker_id,
            assignment_id: self.key.assignment_id,
            day: self.key.day,
            status: self.status,
            entry_time: self.entry_time,
            exit_time: self.exit_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upsert {
    pub create: NewAttendance,
    pub merge: AttendancePatch,
}

impl Upsert {
    /// Explicit status write. Status is always overwritten; entry and exit
    /// times only when supplied.
    pub fn set_status(
        key: DayKey,
        status: AttendanceStatus,
        entry_time: Option<NaiveTime>,
        exit_time: Option<NaiveTime>,
    ) -> Self {
        Self {
            create: NewAttendance {
                key,
                status,
                entry_time,
                exit_time,
            },
            merge: AttendancePatch {
                status: FieldUpdate::Set(status),
                entry_time: FieldUpdate::provided(entry_time),
                exit_time: FieldUpdate::provided(exit_time),
            },
        }
    }

    /// Check-in. Forces Present and always resets the entry time; a later
    /// check-in on the same day replaces the earlier one. Exit is kept.
    pub fn check_in(key: DayKey, now: NaiveTime) -> Self {
        Self {
            create: NewAttendance {
                key,
                status: AttendanceStatus::Present,
                entry_time: Some(now),
                exit_time: None,
            },
            merge: AttendancePatch {
                status: FieldUpdate::Set(AttendanceStatus::Present),
                entry_time: FieldUpdate::Set(now),
                exit_time: FieldUpdate::Keep,
            },
        }
    }

    /// Check-out. Only the exit time changes on an existing record. Without
    /// one, the entry time is back-filled with the exit time.
    pub fn check_out(key: DayKey, now: NaiveTime) -> Self {
        Self {
            create: NewAttendance {
                key,
                status: AttendanceStatus::Present,
                entry_time: Some(now),
                exit_time: Some(now),
            },
            merge: AttendancePatch {
                status: FieldUpdate::Keep,
                entry_time: FieldUpdate::Keep,
                exit_time: FieldUpdate::Set(now),
            },
        }
    }

    pub fn key(&self) -> &DayKey {
        &self.create.key
    }
}
