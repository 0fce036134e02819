use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use utoipa::ToSchema;

use super::error::AttendanceError;

/// The closed set of attendance states. The variant names are the exact
/// labels accepted from callers and written to storage.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
    AsRefStr,
    IntoStaticStr,
    EnumIter,
)]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    Justified,
}

impl AttendanceStatus {
    /// Label written to the `status` column.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Status guard: exact, case-sensitive match against the enumeration.
pub fn check(raw: &str) -> Result<AttendanceStatus, AttendanceError> {
    raw.parse::<AttendanceStatus>()
        .map_err(|_| AttendanceError::InvalidStatus(raw.to_string()))
}
