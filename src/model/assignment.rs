use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Links one worker (the owner) to a work.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Assignment {
    #[schema(example = 7)]
    pub id: u64,

    #[schema(example = 1)]
    pub work_id: u64,

    #[schema(example = "30111222")]
    pub worker_dni: String,

    #[schema(example = "Bricklayer")]
    pub employee_role: String,

    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub assigned_on: NaiveDate,

    #[schema(example = true)]
    pub active: bool,
}
