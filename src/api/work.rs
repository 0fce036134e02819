use crate::error::{ApiError, db_error};
use crate::model::work::Work;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

const SELECT_WORK: &str = "SELECT id, name, address, start_date, end_date, status FROM works";

#[derive(Deserialize, ToSchema)]
pub struct WorkPayload {
    #[schema(example = "Edificio Central")]
    pub name: String,
    #[schema(example = "San Martin 450")]
    pub address: String,
    #[schema(example = "2024-03-01", value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2024-12-20", value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "In progress")]
    pub status: Option<String>,
}

impl WorkPayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() || self.address.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "name and address must not be empty".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ApiError::BadRequest(
                    "start_date cannot be after end_date".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("In progress")
    }
}

pub(crate) async fn fetch_work(pool: &MySqlPool, id: u64) -> Result<Option<Work>, ApiError> {
    let sql = format!("{SELECT_WORK} WHERE id = ?");
    sqlx::query_as::<_, Work>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error("Failed to fetch work"))
}

#[utoipa::path(
    post,
    path = "/api/works",
    request_body = WorkPayload,
    responses(
        (status = 201, description = "Work created", body = Work),
        (status = 400, description = "Invalid payload")
    ),
    tag = "Works",
    security(("bearer_auth" = []))
)]
pub async fn create_work(
    pool: web::Data<MySqlPool>,
    payload: web::Json<WorkPayload>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO works (name, address, start_date, end_date, status)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.address)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.status())
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to create work"))?;

    let id = result.last_insert_id();
    info!(work_id = id, "Work created");

    let work = fetch_work(pool.get_ref(), id)
        .await?
        .ok_or(ApiError::Internal)?;
    Ok(HttpResponse::Created().json(work))
}

#[utoipa::path(
    get,
    path = "/api/works",
    responses((status = 200, description = "All works", body = [Work])),
    tag = "Works",
    security(("bearer_auth" = []))
)]
pub async fn list_works(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let sql = format!("{SELECT_WORK} ORDER BY id DESC");
    let works = sqlx::query_as::<_, Work>(&sql)
        .fetch_all(pool.get_ref())
        .await
        .map_err(db_error("Failed to fetch works"))?;

    Ok(HttpResponse::Ok().json(works))
}

#[utoipa::path(
    get,
    path = "/api/works/{id}",
    params(("id" = u64, Path, description = "Work ID")),
    responses(
        (status = 200, body = Work),
        (status = 404, description = "Work not found")
    ),
    tag = "Works",
    security(("bearer_auth" = []))
)]
pub async fn get_work(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let work = fetch_work(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Work not found".to_string()))?;

    Ok(HttpResponse::Ok().json(work))
}

#[utoipa::path(
    put,
    path = "/api/works/{id}",
    params(("id" = u64, Path, description = "Work ID")),
    request_body = WorkPayload,
    responses(
        (status = 200, description = "Work updated", body = Work),
        (status = 404, description = "Work not found")
    ),
    tag = "Works",
    security(("bearer_auth" = []))
)]
pub async fn update_work(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<WorkPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    payload.validate()?;

    if fetch_work(pool.get_ref(), id).await?.is_none() {
        return Err(ApiError::NotFound("Work not found".to_string()));
    }

    sqlx::query(
        r#"
        UPDATE works
        SET name = ?, address = ?, start_date = ?, end_date = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.address)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.status())
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to update work"))?;

    let work = fetch_work(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Work not found".to_string()))?;
    Ok(HttpResponse::Ok().json(work))
}

#[utoipa::path(
    delete,
    path = "/api/works/{id}",
    params(("id" = u64, Path, description = "Work ID")),
    responses(
        (status = 200, description = "Work deleted"),
        (status = 404, description = "Work not found")
    ),
    tag = "Works",
    security(("bearer_auth" = []))
)]
pub async fn delete_work(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM works WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(db_error("Failed to delete work"))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Work not found".to_string()));
    }

    info!(work_id = id, "Work deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Work deleted" })))
}
