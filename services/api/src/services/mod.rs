//! services/api/src/services/mod.rs
//!
//! The application services: thin validate-then-persist orchestration over
//! the store and attachment ports. Services return typed error kinds and
//! never see HTTP types; the web layer maps kinds to status codes.

pub mod assignments;
pub mod registration;

pub use assignments::{AssignmentService, CreateAssignment, SubmitAssignment};
pub use registration::RegistrationService;

use classline_core::ports::StoreError;

/// Error taxonomy shared by all service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A required field is missing or malformed. Maps to 400.
    #[error("{field} {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },
    /// A unique key was violated. Maps to 400.
    #[error("{0}")]
    Conflict(String),
    /// The attachment adapter failed. Maps to 502.
    #[error("attachment upload failed: {0}")]
    Upload(String),
    /// Any other persistence failure. Maps to 500.
    #[error("store operation failed: {0}")]
    Store(String),
}

impl ServiceError {
    pub(crate) fn missing(field: &'static str) -> Self {
        ServiceError::Validation {
            field,
            reason: "is required".to_string(),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            // The unique index is the authoritative conflict signal; the
            // services' existence pre-checks are advisory only.
            StoreError::DuplicateKey(field) => {
                ServiceError::Conflict(format!("an account with this {} already exists", field))
            }
            StoreError::Backend(msg) => ServiceError::Store(msg),
        }
    }
}

/// Presence check for a required string field. Whitespace-only input counts
/// as missing, matching the falsy-check semantics of the HTTP surface.
pub(crate) fn require_field(
    field: &'static str,
    value: Option<String>,
) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ServiceError::missing(field)),
    }
}
