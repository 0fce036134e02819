use crate::error::{ApiError, db_error};
use crate::model::worker::Worker;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

const SELECT_WORKER: &str = r#"
    SELECT dni, first_name, last_name, phone, email, address, hired_on, is_admin
    FROM workers
"#;

#[derive(Deserialize, ToSchema)]
pub struct CreateWorker {
    #[schema(example = "30111222")]
    pub dni: String,
    #[serde(flatten)]
    pub details: WorkerDetails,
}

/// Everything about a worker except the DNI, which never changes.
#[derive(Deserialize, ToSchema)]
pub struct WorkerDetails {
    #[schema(example = "Juan")]
    pub first_name: String,
    #[schema(example = "Perez")]
    pub last_name: String,
    #[schema(example = "+5493815551234")]
    pub phone: Option<String>,
    #[schema(example = "juan.perez@example.com", format = "email")]
    pub email: Option<String>,
    #[schema(example = "Av. Mate de Luna 1200")]
    pub address: Option<String>,
    #[schema(example = "2024-01-15", value_type = Option<String>, format = "date")]
    pub hired_on: Option<NaiveDate>,
    #[serde(default)]
    #[schema(example = false)]
    pub is_admin: bool,
}

impl WorkerDetails {
    fn validate(&self) -> Result<(), ApiError> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "first_name and last_name must not be empty".to_string(),
            ));
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(ApiError::BadRequest("email is not valid".to_string()));
            }
        }
        Ok(())
    }
}

async fn fetch_worker(pool: &MySqlPool, dni: &str) -> Result<Option<Worker>, ApiError> {
    let sql = format!("{SELECT_WORKER} WHERE dni = ?");
    sqlx::query_as::<_, Worker>(&sql)
        .bind(dni)
        .fetch_optional(pool)
        .await
        .map_err(db_error("Failed to fetch worker"))
}

/// true when another worker (other than `except_dni`) already uses `email`.
async fn email_taken(
    pool: &MySqlPool,
    email: &str,
    except_dni: Option<&str>,
) -> Result<bool, ApiError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM workers WHERE email = ? AND dni <> COALESCE(?, '')",
    )
    .bind(email)
    .bind(except_dni)
    .fetch_one(pool)
    .await
    .map_err(db_error("Failed to check worker email"))?;
    Ok(count > 0)
}

/// Create Worker
#[utoipa::path(
    post,
    path = "/api/workers",
    request_body = CreateWorker,
    responses(
        (status = 201, description = "Worker created", body = Worker),
        (status = 400, description = "DNI or email already in use", body = Object, example = json!({
            "message": "A worker with this DNI already exists"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Workers",
    security(("bearer_auth" = []))
)]
pub async fn create_worker(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateWorker>,
) -> Result<HttpResponse, ApiError> {
    let CreateWorker { dni, details } = payload.into_inner();
    if dni.trim().is_empty() || dni.len() > 15 {
        return Err(ApiError::BadRequest(
            "dni must be between 1 and 15 characters".to_string(),
        ));
    }
    details.validate()?;

    if fetch_worker(pool.get_ref(), &dni).await?.is_some() {
        return Err(ApiError::BadRequest(
            "A worker with this DNI already exists".to_string(),
        ));
    }
    if let Some(email) = &details.email {
        if email_taken(pool.get_ref(), email, None).await? {
            return Err(ApiError::BadRequest("Email is already in use".to_string()));
        }
    }

    sqlx::query(
        r#"
        INSERT INTO workers
            (dni, first_name, last_name, phone, email, address, hired_on, is_admin)
        VALUES (?, ?, ?, ?, ?, ?, COALESCE(?, CURRENT_DATE), ?)
        "#,
    )
    .bind(&dni)
    .bind(&details.first_name)
    .bind(&details.last_name)
    .bind(&details.phone)
    .bind(&details.email)
    .bind(&details.address)
    .bind(details.hired_on)
    .bind(details.is_admin)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to create worker"))?;

    info!(dni = %dni, "Worker created");

    let worker = fetch_worker(pool.get_ref(), &dni)
        .await?
        .ok_or(ApiError::Internal)?;
    Ok(HttpResponse::Created().json(worker))
}

#[utoipa::path(
    get,
    path = "/api/workers",
    responses(
        (status = 200, description = "All workers", body = [Worker])
    ),
    tag = "Workers",
    security(("bearer_auth" = []))
)]
pub async fn list_workers(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let sql = format!("{SELECT_WORKER} ORDER BY last_name, first_name");
    let workers = sqlx::query_as::<_, Worker>(&sql)
        .fetch_all(pool.get_ref())
        .await
        .map_err(db_error("Failed to fetch workers"))?;

    Ok(HttpResponse::Ok().json(workers))
}

#[utoipa::path(
    get,
    path = "/api/workers/{dni}",
    params(("dni" = String, Path, description = "Worker DNI")),
    responses(
        (status = 200, body = Worker),
        (status = 404, description = "Worker not found")
    ),
    tag = "Workers",
    security(("bearer_auth" = []))
)]
pub async fn get_worker(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let dni = path.into_inner();
    let worker = fetch_worker(pool.get_ref(), &dni)
        .await?
        .ok_or_else(|| ApiError::NotFound("Worker not found".to_string()))?;

    Ok(HttpResponse::Ok().json(worker))
}

/// Update Worker
#[utoipa::path(
    put,
    path = "/api/workers/{dni}",
    params(("dni" = String, Path, description = "Worker DNI")),
    request_body = WorkerDetails,
    responses(
        (status = 200, description = "Worker updated", body = Worker),
        (status = 400, description = "Email already in use"),
        (status = 404, description = "Worker not found")
    ),
    tag = "Workers",
    security(("bearer_auth" = []))
)]
pub async fn update_worker(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<WorkerDetails>,
) -> Result<HttpResponse, ApiError> {
    let dni = path.into_inner();
    let details = payload.into_inner();
    details.validate()?;

    let current = fetch_worker(pool.get_ref(), &dni)
        .await?
        .ok_or_else(|| ApiError::NotFound("Worker not found".to_string()))?;

    if let Some(email) = &details.email {
        if current.email.as_deref() != Some(email.as_str())
            && email_taken(pool.get_ref(), email, Some(dni.as_str())).await?
        {
            return Err(ApiError::BadRequest("Email is already in use".to_string()));
        }
    }

    sqlx::query(
        r#"
        UPDATE workers
        SET first_name = ?, last_name = ?, phone = ?, email = ?, address = ?,
            hired_on = COALESCE(?, hired_on), is_admin = ?
        WHERE dni = ?
        "#,
    )
    .bind(&details.first_name)
    .bind(&details.last_name)
    .bind(&details.phone)
    .bind(&details.email)
    .bind(&details.address)
    .bind(details.hired_on)
    .bind(details.is_admin)
    .bind(&dni)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to update worker"))?;

    let worker = fetch_worker(pool.get_ref(), &dni)
        .await?
        .ok_or_else(|| ApiError::NotFound("Worker not found".to_string()))?;
    Ok(HttpResponse::Ok().json(worker))
}

/// Delete Worker. Their assignments and attendance go with them.
#[utoipa::path(
    delete,
    path = "/api/workers/{dni}",
    params(("dni" = String, Path, description = "Worker DNI")),
    responses(
        (status = 200, description = "Worker deleted", body = Object, example = json!({
            "message": "Worker deleted"
        })),
        (status = 404, description = "Worker not found")
    ),
    tag = "Workers",
    security(("bearer_auth" = []))
)]
pub async fn delete_worker(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let dni = path.into_inner();

    let result = sqlx::query("DELETE FROM workers WHERE dni = ?")
        .bind(&dni)
        .execute(pool.get_ref())
        .await
        .map_err(db_error("Failed to delete worker"))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Worker not found".to_string()));
    }

    info!(dni = %dni, "Worker deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Worker deleted" })))
}
