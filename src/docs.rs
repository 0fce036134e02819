use crate::api::assignment::AssignmentPayload;
use crate::api::attendance::{AttendanceFilter, ClockRequest, StatusChange};
use crate::api::budget::BudgetPayload;
use crate::api::work::WorkPayload;
use crate::api::worker::{CreateWorker, WorkerDetails};
use crate::model::assignment::Assignment;
use crate::model::attendance::AttendanceRecord;
use crate::model::budget::Budget;
use crate::model::work::Work;
use crate::model::worker::Worker;
use crate::reconcile::AttendanceStatus;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Worksite Attendance API",
        version = "1.0.0",
        description = r#"
## Construction works administration

Tracks works, their budgets, the workers assigned to them and the daily
attendance of each worker on each assignment.

### Attendance
- `POST /attendance/check-in` and `POST /attendance/check-out` record today's
  entry and exit at the current time.
- `POST /attendance` sets the status (`Present`, `Absent`, `Justified`) of a
  worker for a day, optionally with entry/exit times.
- Every call resolves to a single record per worker, assignment and day.
  Repeated calls update that record instead of creating new ones.

### Security
All `/api` endpoints require a **JWT Bearer** access token.
"#,
    ),
    paths(
        crate::api::health::health,

        crate::api::worker::create_worker,
        crate::api::worker::list_workers,
        crate::api::worker::get_worker,
        crate::api::worker::update_worker,
        crate::api::worker::delete_worker,

        crate::api::work::create_work,
        crate::api::work::list_works,
        crate::api::work::get_work,
        crate::api::work::update_work,
        crate::api::work::delete_work,

        crate::api::budget::create_budget,
        crate::api::budget::list_budgets,
        crate::api::budget::get_budget,
        crate::api::budget::update_budget,
        crate::api::budget::delete_budget,

        crate::api::assignment::create_assignment,
        crate::api::assignment::list_assignments,
        crate::api::assignment::get_assignment,
        crate::api::assignment::update_assignment,
        crate::api::assignment::delete_assignment,

        crate::api::attendance::set_status,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::list_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::delete_attendance
    ),
    components(
        schemas(
            Worker,
            CreateWorker,
            WorkerDetails,
            Work,
            WorkPayload,
            Budget,
            BudgetPayload,
            Assignment,
            AssignmentPayload,
            AttendanceRecord,
            AttendanceStatus,
            AttendanceFilter,
            StatusChange,
            ClockRequest
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Workers", description = "Worker management APIs"),
        (name = "Works", description = "Construction work management APIs"),
        (name = "Budgets", description = "Work budget APIs"),
        (name = "Assignments", description = "Worker-to-work assignment APIs"),
        (name = "Attendance", description = "Daily attendance APIs"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_attendance_operations_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/attendance",
            "/api/attendance/check-in",
            "/api/attendance/check-out",
            "/api/attendance/{id}",
            "/api/workers/{dni}",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("AttendanceStatus"));
    }
}
