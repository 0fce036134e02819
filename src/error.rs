use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde_json::json;
use tracing::error;

use crate::reconcile::AttendanceError;

/// Error returned by every handler. The message is what the client sees;
/// internal details are logged where the failure happens.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "{}", _0)]
    BadRequest(String),

    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

impl From<AttendanceError> for ApiError {
    fn from(e: AttendanceError) -> Self {
        match e {
            AttendanceError::WorkerNotFound(_) | AttendanceError::AssignmentNotFound(_) => {
                ApiError::NotFound(e.to_string())
            }
            AttendanceError::OwnershipConflict { .. } => ApiError::Conflict(e.to_string()),
            AttendanceError::InvalidStatus(_) => ApiError::BadRequest(e.to_string()),
            AttendanceError::Storage(store_err) => {
                error!(error = %store_err, "Attendance storage failure");
                ApiError::Internal
            }
        }
    }
}

/// Logs a database failure with `context` and hides it behind a 500.
pub fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
    move |e| {
        error!(error = %e, "{}", context);
        ApiError::Internal
    }
}
