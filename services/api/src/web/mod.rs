//! services/api/src/web/mod.rs
//!
//! The transport layer: axum handlers, the shared error-to-status mapping,
//! and the master OpenAPI definition.

pub mod accounts;
pub mod assignments;
pub mod state;

pub use accounts::{
    list_students_handler, list_teachers_handler, register_student_handler,
    register_teacher_handler,
};
pub use assignments::{
    create_assignment_handler, list_assignments_handler, list_submissions_handler,
    submit_assignment_handler,
};

use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

use crate::services::ServiceError;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        accounts::register_teacher_handler,
        accounts::register_student_handler,
        accounts::list_teachers_handler,
        accounts::list_students_handler,
        assignments::create_assignment_handler,
        assignments::list_assignments_handler,
        assignments::submit_assignment_handler,
        assignments::list_submissions_handler,
    ),
    components(schemas(
        ErrorBody,
        accounts::AccountDto,
        accounts::RegisterRequest,
        accounts::TeacherEnvelope,
        accounts::StudentEnvelope,
        assignments::AssignmentDto,
        assignments::SubmissionDto,
        assignments::CreateAssignmentRequest,
        assignments::CreateAssignmentResponse,
        assignments::SubmitAssignmentResponse,
    )),
    tags(
        (name = "Classline API", description = "Accounts, assignments, and submissions for the education platform.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// JSON error envelope returned for every failed request.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Maps a service error kind to its HTTP response.
///
/// Validation and conflict messages are returned to the caller verbatim;
/// upstream and store failures are logged with context and collapsed to a
/// generic message.
pub(crate) fn map_service_error(
    context: &'static str,
    err: ServiceError,
) -> (StatusCode, Json<ErrorBody>) {
    match err {
        ServiceError::Validation { .. } | ServiceError::Conflict(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: err.to_string(),
            }),
        ),
        ServiceError::Upload(detail) => {
            error!("{}: attachment upload failed: {}", context, detail);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: "attachment upload failed".to_string(),
                }),
            )
        }
        ServiceError::Store(detail) => {
            error!("{}: store failure: {}", context, detail);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "internal server error".to_string(),
                }),
            )
        }
    }
}

/// Liveness probe for `GET /`.
pub async fn liveness_handler() -> &'static str {
    "Classline API is running"
}
