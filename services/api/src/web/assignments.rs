//! services/api/src/web/assignments.rs
//!
//! Handlers for the assignment lifecycle: creation, listing, multipart
//! submission upload, and submission listing.

use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use chrono::{DateTime, Utc};
use classline_core::domain::{Assignment, Submission};
use classline_core::ports::AttachmentFile;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::services::{CreateAssignment, SubmitAssignment};
use crate::web::state::AppState;
use crate::web::{map_service_error, ErrorBody};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub instructor_email: Option<String>,
    pub course_id: Option<String>,
    pub section: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListAssignmentsQuery {
    pub course_id: Option<String>,
    pub section: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListSubmissionsQuery {
    pub student_email: Option<String>,
    pub course_id: Option<String>,
    pub section: Option<String>,
}

/// Wire shape of an assignment.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDto {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub instructor_email: String,
    pub course_id: String,
    pub section: String,
    pub created_at: DateTime<Utc>,
}

impl From<Assignment> for AssignmentDto {
    fn from(assignment: Assignment) -> Self {
        Self {
            id: assignment.id.to_hex(),
            title: assignment.title,
            description: assignment.description,
            due_date: assignment.due_date,
            instructor_email: assignment.instructor_email,
            course_id: assignment.course_id.to_hex(),
            section: assignment.section,
            created_at: assignment.created_at,
        }
    }
}

/// Wire shape of a submission.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDto {
    pub id: String,
    pub assignment_id: String,
    pub student_email: String,
    pub course_id: String,
    pub section: String,
    pub file_url: String,
    pub file_type: String,
    pub submitted_at: DateTime<Utc>,
}

impl From<Submission> for SubmissionDto {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id.to_hex(),
            assignment_id: submission.assignment_id.to_hex(),
            student_email: submission.student_email,
            course_id: submission.course_id.to_hex(),
            section: submission.section,
            file_url: submission.file_url,
            file_type: submission.file_type,
            submitted_at: submission.submitted_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CreateAssignmentResponse {
    pub message: String,
    pub assignment: AssignmentDto,
}

#[derive(Serialize, ToSchema)]
pub struct SubmitAssignmentResponse {
    pub message: String,
    pub submission: SubmissionDto,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Create a new assignment for a course section.
#[utoipa::path(
    post,
    path = "/assignments",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = CreateAssignmentResponse),
        (status = 400, description = "Missing or malformed field", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_assignment_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let assignment = state
        .assignments
        .create_assignment(CreateAssignment {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            instructor_email: req.instructor_email,
            course_id: req.course_id,
            section: req.section,
        })
        .await
        .map_err(|e| map_service_error("create assignment", e))?;
    Ok((
        StatusCode::CREATED,
        Json(CreateAssignmentResponse {
            message: "assignment created".to_string(),
            assignment: assignment.into(),
        }),
    ))
}

/// List assignments for a course section, newest first.
#[utoipa::path(
    get,
    path = "/assignments",
    params(ListAssignmentsQuery),
    responses(
        (status = 200, description = "Matching assignments, newest first", body = [AssignmentDto]),
        (status = 400, description = "Missing filter", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_assignments_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListAssignmentsQuery>,
) -> Result<Json<Vec<AssignmentDto>>, (StatusCode, Json<ErrorBody>)> {
    let assignments = state
        .assignments
        .list_assignments(query.course_id, query.section)
        .await
        .map_err(|e| map_service_error("list assignments", e))?;
    Ok(Json(
        assignments.into_iter().map(AssignmentDto::from).collect(),
    ))
}

/// Submit an assignment with an attached file.
///
/// Accepts a multipart/form-data request carrying the text fields
/// `assignmentId`, `studentEmail`, `courseId`, `section`, and one `file` part.
#[utoipa::path(
    post,
    path = "/assignments/submit",
    request_body(content_type = "multipart/form-data", description = "Submission fields plus one file part."),
    responses(
        (status = 201, description = "Submission stored", body = SubmitAssignmentResponse),
        (status = 400, description = "Missing field or file", body = ErrorBody),
        (status = 502, description = "Attachment storage unavailable", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn submit_assignment_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let input = read_submission_form(multipart).await?;
    let submission = state
        .assignments
        .submit_assignment(input)
        .await
        .map_err(|e| map_service_error("submit assignment", e))?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitAssignmentResponse {
            message: "submission stored".to_string(),
            submission: submission.into(),
        }),
    ))
}

/// List a student's submissions for a course section.
#[utoipa::path(
    get,
    path = "/assignments/submissions",
    params(ListSubmissionsQuery),
    responses(
        (status = 200, description = "Matching submissions", body = [SubmissionDto]),
        (status = 400, description = "Missing filter", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_submissions_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListSubmissionsQuery>,
) -> Result<Json<Vec<SubmissionDto>>, (StatusCode, Json<ErrorBody>)> {
    let submissions = state
        .assignments
        .list_submissions(query.student_email, query.course_id, query.section)
        .await
        .map_err(|e| map_service_error("list submissions", e))?;
    Ok(Json(
        submissions.into_iter().map(SubmissionDto::from).collect(),
    ))
}

/// Drains the multipart form into the service's raw input shape. Unknown
/// parts are skipped; presence checks happen in the service.
async fn read_submission_form(
    mut multipart: Multipart,
) -> Result<SubmitAssignment, (StatusCode, Json<ErrorBody>)> {
    let mut input = SubmitAssignment::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("assignmentId") => {
                input.assignment_id = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("studentEmail") => {
                input.student_email = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("courseId") => {
                input.course_id = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("section") => {
                input.section = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("attachment").to_string();
                let content_type = field
                    .content_type()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field.bytes().await.map_err(multipart_error)?;
                input.file = Some(AttachmentFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    Ok(input)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: format!("failed to read multipart data: {}", err),
        }),
    )
}
