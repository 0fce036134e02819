use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

/// Source of "now" and "today" for reconciliation. Wall-clock local time,
/// no timezone normalization.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    /// Truncated to whole seconds, matching the precision of a TIME column.
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

#[cfg(test)]
pub use fixed::FixedClock;
