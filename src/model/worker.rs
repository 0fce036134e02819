use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "dni": "30111222",
        "first_name": "Juan",
        "last_name": "Perez",
        "phone": "+5493815551234",
        "email": "juan.perez@example.com",
        "address": "Av. Mate de Luna 1200",
        "hired_on": "2024-01-15",
        "is_admin": false
    })
)]
pub struct Worker {
    #[schema(example = "30111222")]
    pub dni: String,

    #[schema(example = "Juan")]
    pub first_name: String,

    #[schema(example = "Perez")]
    pub last_name: String,

    #[schema(example = "+5493815551234", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "juan.perez@example.com", format = "email", nullable = true)]
    pub email: Option<String>,

    #[schema(example = "Av. Mate de Luna 1200", nullable = true)]
    pub address: Option<String>,

    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub hired_on: NaiveDate,

    #[schema(example = false)]
    pub is_admin: bool,
}
