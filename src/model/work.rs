use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A construction work (site) that workers are assigned to.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Work {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Edificio Central")]
    pub name: String,

    #[schema(example = "San Martin 450")]
    pub address: String,

    #[schema(example = "2024-03-01", value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,

    #[schema(example = "2024-12-20", value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,

    #[schema(example = "In progress")]
    pub status: String,
}
