//! services/api/src/web/accounts.rs
//!
//! Handlers for teacher and student registration and listing.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use chrono::{DateTime, Utc};
use classline_core::domain::{Account, AccountRole};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::web::state::AppState;
use crate::web::{map_service_error, ErrorBody};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: Option<String>,
}

/// Wire shape of an account.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub id: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_hex(),
            email: account.email,
            role: account.role.as_str().to_string(),
            status: account.status.as_str().to_string(),
            created_at: account.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TeacherEnvelope {
    pub teacher: AccountDto,
}

#[derive(Serialize, ToSchema)]
pub struct StudentEnvelope {
    pub student: AccountDto,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Register a new teacher account.
#[utoipa::path(
    post,
    path = "/teachers",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Teacher registered", body = TeacherEnvelope),
        (status = 400, description = "Invalid or duplicate email", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn register_teacher_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let account = state
        .registration
        .register(req.email, AccountRole::Teacher)
        .await
        .map_err(|e| map_service_error("register teacher", e))?;
    Ok((
        StatusCode::CREATED,
        Json(TeacherEnvelope {
            teacher: account.into(),
        }),
    ))
}

/// Register a new student account.
#[utoipa::path(
    post,
    path = "/students",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Student registered", body = StudentEnvelope),
        (status = 400, description = "Invalid or duplicate email", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn register_student_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let account = state
        .registration
        .register(req.email, AccountRole::Student)
        .await
        .map_err(|e| map_service_error("register student", e))?;
    Ok((
        StatusCode::CREATED,
        Json(StudentEnvelope {
            student: account.into(),
        }),
    ))
}

/// List all teacher accounts.
#[utoipa::path(
    get,
    path = "/teachers",
    responses(
        (status = 200, description = "All teacher accounts", body = [AccountDto]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_teachers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AccountDto>>, (StatusCode, Json<ErrorBody>)> {
    let accounts = state
        .registration
        .list(AccountRole::Teacher)
        .await
        .map_err(|e| map_service_error("list teachers", e))?;
    Ok(Json(accounts.into_iter().map(AccountDto::from).collect()))
}

/// List all student accounts.
#[utoipa::path(
    get,
    path = "/students",
    responses(
        (status = 200, description = "All student accounts", body = [AccountDto]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_students_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AccountDto>>, (StatusCode, Json<ErrorBody>)> {
    let accounts = state
        .registration
        .list(AccountRole::Student)
        .await
        .map_err(|e| map_service_error("list students", e))?;
    Ok(Json(accounts.into_iter().map(AccountDto::from).collect()))
}
