use crate::api::work::fetch_work;
use crate::error::{ApiError, db_error};
use crate::model::budget::Budget;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

const SELECT_BUDGET: &str =
    "SELECT id, work_id, amount, material_types, budget_date FROM budgets";

#[derive(Deserialize, ToSchema)]
pub struct BudgetPayload {
    #[schema(example = 1)]
    pub work_id: u64,
    #[schema(example = 125000.5)]
    pub amount: f64,
    #[schema(example = "Cement, rebar")]
    pub material_types: Option<String>,
    #[schema(example = "2024-03-01", value_type = Option<String>, format = "date")]
    pub budget_date: Option<NaiveDate>,
}

fn validate_amount(amount: f64) -> Result<(), ApiError> {
    // NaN fails this comparison too.
    if amount > 0.0 {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "Amount must be greater than 0".to_string(),
        ))
    }
}

/// Amount first, then the referenced work.
async fn validate_payload(pool: &MySqlPool, payload: &BudgetPayload) -> Result<(), ApiError> {
    validate_amount(payload.amount)?;
    if fetch_work(pool, payload.work_id).await?.is_none() {
        return Err(ApiError::NotFound("Work does not exist".to_string()));
    }
    Ok(())
}

async fn fetch_budget(pool: &MySqlPool, id: u64) -> Result<Option<Budget>, ApiError> {
    let sql = format!("{SELECT_BUDGET} WHERE id = ?");
    sqlx::query_as::<_, Budget>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error("Failed to fetch budget"))
}

#[utoipa::path(
    post,
    path = "/api/budgets",
    request_body = BudgetPayload,
    responses(
        (status = 201, description = "Budget created", body = Budget),
        (status = 400, description = "Amount must be greater than 0"),
        (status = 404, description = "Work does not exist")
    ),
    tag = "Budgets",
    security(("bearer_auth" = []))
)]
pub async fn create_budget(
    pool: web::Data<MySqlPool>,
    payload: web::Json<BudgetPayload>,
) -> Result<HttpResponse, ApiError> {
    validate_payload(pool.get_ref(), &payload).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO budgets (work_id, amount, material_types, budget_date)
        VALUES (?, ?, ?, COALESCE(?, CURRENT_DATE))
        "#,
    )
    .bind(payload.work_id)
    .bind(payload.amount)
    .bind(&payload.material_types)
    .bind(payload.budget_date)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to create budget"))?;

    let id = result.last_insert_id();
    info!(budget_id = id, work_id = payload.work_id, "Budget created");

    let budget = fetch_budget(pool.get_ref(), id)
        .await?
        .ok_or(ApiError::Internal)?;
    Ok(HttpResponse::Created().json(budget))
}

#[utoipa::path(
    get,
    path = "/api/budgets",
    responses((status = 200, description = "All budgets", body = [Budget])),
    tag = "Budgets",
    security(("bearer_auth" = []))
)]
pub async fn list_budgets(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let sql = format!("{SELECT_BUDGET} ORDER BY budget_date DESC, id DESC");
    let budgets = sqlx::query_as::<_, Budget>(&sql)
        .fetch_all(pool.get_ref())
        .await
        .map_err(db_error("Failed to fetch budgets"))?;

    Ok(HttpResponse::Ok().json(budgets))
}

#[utoipa::path(
    get,
    path = "/api/budgets/{id}",
    params(("id" = u64, Path, description = "Budget ID")),
    responses(
        (status = 200, body = Budget),
        (status = 404, description = "Budget not found")
    ),
    tag = "Budgets",
    security(("bearer_auth" = []))
)]
pub async fn get_budget(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let budget = fetch_budget(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Budget not found".to_string()))?;

    Ok(HttpResponse::Ok().json(budget))
}

#[utoipa::path(
    put,
    path = "/api/budgets/{id}",
    params(("id" = u64, Path, description = "Budget ID")),
    request_body = BudgetPayload,
    responses(
        (status = 200, description = "Budget updated", body = Budget),
        (status = 400, description = "Amount must be greater than 0"),
        (status = 404, description = "Budget or work not found")
    ),
    tag = "Budgets",
    security(("bearer_auth" = []))
)]
pub async fn update_budget(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<BudgetPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    if fetch_budget(pool.get_ref(), id).await?.is_none() {
        return Err(ApiError::NotFound("Budget not found".to_string()));
    }
    validate_payload(pool.get_ref(), &payload).await?;

    sqlx::query(
        r#"
        UPDATE budgets
        SET work_id = ?, amount = ?, material_types = ?,
            budget_date = COALESCE(?, budget_date)
        WHERE id = ?
        "#,
    )
    .bind(payload.work_id)
    .bind(payload.amount)
    .bind(&payload.material_types)
    .bind(payload.budget_date)
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(db_error("Failed to update budget"))?;

    let budget = fetch_budget(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Budget not found".to_string()))?;
    Ok(HttpResponse::Ok().json(budget))
}

#[utoipa::path(
    delete,
    path = "/api/budgets/{id}",
    params(("id" = u64, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "Budget deleted"),
        (status = 404, description = "Budget not found")
    ),
    tag = "Budgets",
    security(("bearer_auth" = []))
)]
pub async fn delete_budget(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM budgets WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(db_error("Failed to delete budget"))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Budget not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Budget deleted" })))
}
