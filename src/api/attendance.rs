use crate::auth::auth::AuthUser;
use crate::error::{ApiError, db_error};
use crate::model::attendance::{AttendanceRecord, AttendanceRow};
use crate::reconcile::{AttendanceStore, Clock, Directory, Reconciler};
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

/// Explicit attendance write. Missing day means today, missing status means
/// Present, missing times leave stored ones alone.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "worker_id": "30111222",
    "assignment_id": 7,
    "day": "2024-05-01",
    "status": "Justified"
}))]
pub struct StatusChange {
    pub worker_id: String,
    pub assignment_id: u64,
    #[schema(value_type = Option<String>, format = "date")]
    pub day: Option<NaiveDate>,
    #[schema(example = "Present")]
    pub status: Option<String>,
    #[schema(value_type = Option<String>, example = "08:00:00")]
    pub entry_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "17:00:00")]
    pub exit_time: Option<NaiveTime>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClockRequest {
    #[schema(example = "30111222")]
    pub worker_id: String,
    #[schema(example = 7)]
    pub assignment_id: u64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    /// Filter by worker DNI
    pub worker_id: Option<String>,
    /// Filter by assignment
    pub assignment_id: Option<u64>,
    /// Filter by day (YYYY-MM-DD)
    pub day: Option<NaiveDate>,
}

/// Create or update the attendance of a worker for a day
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = StatusChange,
    responses(
        (status = 201, description = "Resulting attendance record", body = AttendanceRecord),
        (status = 400, description = "Invalid status", body = Object, example = json!({
            "message": "Invalid status \"Late\". Allowed: Present, Absent, Justified"
        })),
        (status = 404, description = "Worker or assignment not found"),
        (status = 409, description = "Assignment belongs to another worker"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn set_status<S, C>(
    auth: AuthUser,
    service: web::Data<Reconciler<S, C>>,
    payload: web::Json<StatusChange>,
) -> Result<HttpResponse, ApiError>
where
    S: Directory + AttendanceStore + 'static,
    C: Clock + 'static,
{
    let change = payload.into_inner();
    let record = service
        .set_status(
            &change.worker_id,
            change.assignment_id,
            change.day,
            change.status.as_deref(),
            change.entry_time,
            change.exit_time,
        )
        .await?;
    info!(recorded_by = %auth.subject, record_id = record.id, "Attendance status set");
    Ok(HttpResponse::Created().json(record))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Checked in", body = AttendanceRecord),
        (status = 404, description = "Worker or assignment not found"),
        (status = 409, description = "Assignment belongs to another worker"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in<S, C>(
    auth: AuthUser,
    service: web::Data<Reconciler<S, C>>,
    payload: web::Json<ClockRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: Directory + AttendanceStore + 'static,
    C: Clock + 'static,
{
    let record = service
        .mark_entry(&payload.worker_id, payload.assignment_id)
        .await?;
    info!(recorded_by = %auth.subject, record_id = record.id, "Checked in");
    Ok(HttpResponse::Ok().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Checked out", body = AttendanceRecord),
        (status = 404, description = "Worker or assignment not found"),
        (status = 409, description = "Assignment belongs to another worker"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out<S, C>(
    auth: AuthUser,
    service: web::Data<Reconciler<S, C>>,
    payload: web::Json<ClockRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: Directory + AttendanceStore + 'static,
    C: Clock + 'static,
{
    let record = service
        .mark_exit(&payload.worker_id, payload.assignment_id)
        .await?;
    info!(recorded_by = %auth.subject, record_id = record.id, "Checked out");
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Attendance records", body = [AttendanceRecord])
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> Result<HttpResponse, ApiError> {
    let mut conditions = Vec::new();
    if query.worker_id.is_some() {
        conditions.push("worker_id = ?");
    }
    if query.assignment_id.is_some() {
        conditions.push("assignment_id = ?");
    }
    if query.day.is_some() {
        conditions.push("day = ?");
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let sql = format!(
        r#"
        SELECT id, worker_id, assignment_id, day, status, entry_time, exit_time
        FROM attendance
        {where_clause}
        ORDER BY day DESC, id DESC
        "#
    );

    let mut q = sqlx::query_as::<_, AttendanceRow>(&sql);
    if let Some(worker_id) = &query.worker_id {
        q = q.bind(worker_id);
    }
    if let Some(assignment_id) = query.assignment_id {
        q = q.bind(assignment_id);
    }
    if let Some(day) = query.day {
        q = q.bind(day);
    }

    let rows = q
        .fetch_all(pool.get_ref())
        .await
        .map_err(db_error("Failed to fetch attendance list"))?;

    let records = rows
        .into_iter()
        .map(AttendanceRecord::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            tracing::error!(error = %e, "Unreadable attendance row");
            ApiError::Internal
        })?;

    Ok(HttpResponse::Ok().json(records))
}

#[utoipa::path(
    get,
    path = "/api/attendance/{id}",
    params(("id" = u64, Path, description = "Attendance record ID")),
    responses(
        (status = 200, body = AttendanceRecord),
        (status = 404, description = "Attendance record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let row = sqlx::query_as::<_, AttendanceRow>(
        r#"
        SELECT id, worker_id, assignment_id, day, status, entry_time, exit_time
        FROM attendance
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(db_error("Failed to fetch attendance record"))?
    .ok_or_else(|| ApiError::NotFound("Attendance record not found".to_string()))?;

    let record = AttendanceRecord::try_from(row).map_err(|e| {
        tracing::error!(error = %e, id, "Unreadable attendance row");
        ApiError::Internal
    })?;

    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(("id" = u64, Path, description = "Attendance record ID")),
    responses(
        (status = 200, description = "Attendance record deleted"),
        (status = 404, description = "Attendance record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(db_error("Failed to delete attendance record"))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Attendance record not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance record deleted"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::tests::token;
    use crate::auth::middleware::auth_middleware;
    use crate::config::Config;
    use crate::models::TokenType;
    use crate::reconcile::clock::FixedClock;
    use crate::reconcile::memory::MemoryStore;
    use actix_web::App;
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::test::{TestRequest, call_service, init_service, read_body_json};
    use serde_json::{Value, json};

    type TestService = Reconciler<MemoryStore, FixedClock>;

    fn config() -> Config {
        Config::from_vars(|key| match key {
            "SERVER_ADDR" => Some("127.0.0.1:0".to_string()),
            "DATABASE_URL" => Some("mysql://localhost/worksite".to_string()),
            "JWT_SECRET" => Some("s3cret".to_string()),
            _ => None,
        })
        .unwrap()
    }

    /// W1 owns assignment 1; W2 exists but owns nothing. Clock at 2024-05-01 08:00.
    fn service() -> web::Data<TestService> {
        let store = MemoryStore::default()
            .with_worker("W1")
            .with_worker("W2")
            .with_assignment(1, "W1");
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        web::Data::new(Reconciler::new(store, FixedClock::at(day, 8, 0)))
    }

    macro_rules! app {
        ($service:expr) => {
            init_service(
                App::new()
                    .app_data(web::Data::new(config()))
                    .app_data($service.clone())
                    .service(
                        web::scope("/api/attendance")
                            .wrap(from_fn(auth_middleware))
                            .route("", web::post().to(set_status::<MemoryStore, FixedClock>))
                            .route(
                                "/check-in",
                                web::post().to(check_in::<MemoryStore, FixedClock>),
                            )
                            .route(
                                "/check-out",
                                web::post().to(check_out::<MemoryStore, FixedClock>),
                            ),
                    ),
            )
            .await
        };
    }

    fn post(uri: &str, body: Value) -> TestRequest {
        TestRequest::post()
            .uri(uri)
            .insert_header((
                "Authorization",
                format!("Bearer {}", token("site-admin", TokenType::Access, 600, "s3cret")),
            ))
            .set_json(body)
    }

    #[actix_web::test]
    async fn check_in_check_out_then_justify_over_http() {
        let service = service();
        let app = app!(service);
        let clock_body = json!({ "worker_id": "W1", "assignment_id": 1 });

        let entry_req = post("/api/attendance/check-in", clock_body.clone()).to_request();
        let resp = call_service(&app, entry_req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let entered: Value = read_body_json(resp).await;
        assert_eq!(entered["day"], "2024-05-01");
        assert_eq!(entered["status"], "Present");
        assert_eq!(entered["entry_time"], "08:00:00");
        assert_eq!(entered["exit_time"], Value::Null);

        service.clock().set(17, 0);
        let exit_req = post("/api/attendance/check-out", clock_body).to_request();
        let resp = call_service(&app, exit_req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let exited: Value = read_body_json(resp).await;
        assert_eq!(exited["id"], entered["id"]);
        assert_eq!(exited["exit_time"], "17:00:00");

        let resp = call_service(
            &app,
            post(
                "/api/attendance",
                json!({ "worker_id": "W1", "assignment_id": 1, "status": "Justified" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let justified: Value = read_body_json(resp).await;
        assert_eq!(justified["id"], entered["id"]);
        assert_eq!(justified["status"], "Justified");
        assert_eq!(justified["entry_time"], "08:00:00");
        assert_eq!(justified["exit_time"], "17:00:00");

        assert_eq!(service.store().records().len(), 1);
    }

    #[actix_web::test]
    async fn foreign_assignment_is_a_conflict() {
        let service = service();
        let app = app!(service);

        for (uri, body) in [
            ("/api/attendance/check-in", json!({ "worker_id": "W2", "assignment_id": 1 })),
            ("/api/attendance/check-out", json!({ "worker_id": "W2", "assignment_id": 1 })),
            (
                "/api/attendance",
                json!({ "worker_id": "W2", "assignment_id": 1, "status": "Present" }),
            ),
        ] {
            let resp = call_service(&app, post(uri, body).to_request()).await;
            assert_eq!(resp.status(), StatusCode::CONFLICT, "{uri}");
            let body: Value = read_body_json(resp).await;
            assert_eq!(body["message"], "Assignment 1 does not belong to worker W2");
        }
        assert_eq!(service.store().writes(), 0);
    }

    #[actix_web::test]
    async fn unsupported_status_is_a_bad_request() {
        let service = service();
        let app = app!(service);

        let resp = call_service(
            &app,
            post(
                "/api/attendance",
                json!({ "worker_id": "W1", "assignment_id": 1, "status": "Late" }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(
            body["message"],
            "Invalid status \"Late\". Allowed: Present, Absent, Justified"
        );
        assert!(service.store().records().is_empty());
    }

    #[actix_web::test]
    async fn unknown_worker_or_assignment_is_not_found() {
        let service = service();
        let app = app!(service);

        for body in [
            json!({ "worker_id": "W9", "assignment_id": 1 }),
            json!({ "worker_id": "W1", "assignment_id": 99 }),
        ] {
            let req = post("/api/attendance/check-in", body).to_request();
            let resp = call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }
    }
}
