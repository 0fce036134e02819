use crate::api::work::fetch_work;
use crate::error::{ApiError, db_error};
use crate::model::assignment::Assignment;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

const SELECT_ASSIGNMENT: &str =
    "SELECT id, work_id, worker_dni, employee_role, assigned_on, active FROM assignments";

#[derive(Deserialize, ToSchema)]
pub struct AssignmentPayload {
    #[schema(example = 1)]
    pub work_id: u64,
    #[schema(example = "30111222")]
    pub worker_dni: String,
    #[schema(example = "Bricklayer")]
    pub employee_role: String,
    #[schema(example = "2024-03-01", value_type = Option<String>, format = "date")]
    pub assigned_on: Option<NaiveDate>,
    #[schema(example = true)]
    pub active: Option<bool>,
}

/// Both the work and the worker must exist.
async fn check_references(pool: &MySqlPool, payload: &AssignmentPayload) -> Result<(), ApiError> {
    if fetch_work(pool, payload.work_id).await?.is_none() {
        return Err(ApiError::NotFound("Work does not exist".to_string()));
    }

    let workers = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM workers WHERE dni = ?")
        .bind(&payload.worker_dni)
        .fetch_one(pool)
        .await
        .map_err(db_error("Failed to check worker"))?;
    if workers == 0 {
        return Err(ApiError::NotFound("Worker does not exist".to_string()));
    }

    Ok(())
}

async fn fetch_assignment(pool: &MySqlPool, id: u64) -> Result<Option<Assignment>, ApiError> {
    let sql = format!("{SELECT_ASSIGNMENT} WHERE id = ?");
    sqlx::query_as::<_, Assignment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error("Failed to fetch assignment"))
}

#[utoipa::path(
    post,
    path = "/api/assignments",
    request_body = AssignmentPayload,
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 404, description = "Work or worker does not exist")
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn create_assignment(
    pool: web::Data<MySqlPool>,
    payload: web::Json<AssignmentPayload>,
) -> Result<HttpResponse, ApiError> {
    check_references(pool.get_ref(), &payload).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO assignments (work_id, worker_dni, employee_role, assigned_on, active)
        VALUES (?, ?, ?, COALESCE(?, CURRENT_DATE), ?)
        "#,
    )
    .bind(payload.work_id)
    .bind(&payload.worker_dni)
    .bind(&payload.employee_role)
    .bind(payload.assigned_on)
    .bind(payload.active.unwrap_or(true))
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to create assignment"))?;

    let id = result.last_insert_id();
    info!(
        assignment_id = id,
        work_id = payload.work_id,
        worker_dni = %payload.worker_dni,
        "Assignment created"
    );

    let assignment = fetch_assignment(pool.get_ref(), id)
        .await?
        .ok_or(ApiError::Internal)?;
    Ok(HttpResponse::Created().json(assignment))
}

#[utoipa::path(
    get,
    path = "/api/assignments",
    responses((status = 200, description = "All assignments", body = [Assignment])),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn list_assignments(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let sql = format!("{SELECT_ASSIGNMENT} ORDER BY id DESC");
    let assignments = sqlx::query_as::<_, Assignment>(&sql)
        .fetch_all(pool.get_ref())
        .await
        .map_err(db_error("Failed to fetch assignments"))?;

    Ok(HttpResponse::Ok().json(assignments))
}

#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    params(("id" = u64, Path, description = "Assignment ID")),
    responses(
        (status = 200, body = Assignment),
        (status = 404, description = "Assignment not found")
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn get_assignment(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let assignment = fetch_assignment(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

    Ok(HttpResponse::Ok().json(assignment))
}

#[utoipa::path(
    put,
    path = "/api/assignments/{id}",
    params(("id" = u64, Path, description = "Assignment ID")),
    request_body = AssignmentPayload,
    responses(
        (status = 200, description = "Assignment updated", body = Assignment),
        (status = 404, description = "Assignment, work or worker not found")
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn update_assignment(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<AssignmentPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let current = fetch_assignment(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;
    check_references(pool.get_ref(), &payload).await?;

    sqlx::query(
        r#"
        UPDATE assignments
        SET work_id = ?, worker_dni = ?, employee_role = ?, assigned_on = ?, active = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.work_id)
    .bind(&payload.worker_dni)
    .bind(&payload.employee_role)
    .bind(payload.assigned_on.unwrap_or(current.assigned_on))
    .bind(payload.active.unwrap_or(current.active))
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to update assignment"))?;

    let assignment = fetch_assignment(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;
    Ok(HttpResponse::Ok().json(assignment))
}

#[utoipa::path(
    delete,
    path = "/api/assignments/{id}",
    params(("id" = u64, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found")
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn delete_assignment(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM assignments WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(db_error("Failed to delete assignment"))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Assignment not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Assignment deleted" })))
}
