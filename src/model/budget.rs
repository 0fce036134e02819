use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Budget {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub work_id: u64,

    #[schema(example = 125000.5)]
    pub amount: f64,

    #[schema(example = "Cement, rebar", nullable = true)]
    pub material_types: Option<String>,

    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub budget_date: NaiveDate,
}
