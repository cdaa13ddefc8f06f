//! crates/classline_core/src/domain.rs
//!
//! Defines the core entities for the platform. These structs double as the
//! document shapes persisted by the store adapter, so they carry the usual
//! `_id` rename and BSON datetime serde helpers.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role carried by an [`Account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Teacher,
    Student,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Teacher => "teacher",
            AccountRole::Student => "student",
        }
    }
}

/// Account status, assigned once at registration and never transitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Active,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Active => "active",
        }
    }
}

/// A registered teacher or student account. Email is unique across the
/// collection, enforced by a store-level index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub role: AccountRole,
    pub status: AccountStatus,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Insert shape for an [`Account`]; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub role: AccountRole,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

/// An assignment posted by a teacher for one course section.
/// Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub due_date: DateTime<Utc>,
    pub instructor_email: String,
    pub course_id: ObjectId,
    pub section: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Insert shape for an [`Assignment`].
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub instructor_email: String,
    pub course_id: ObjectId,
    pub section: String,
    pub created_at: DateTime<Utc>,
}

/// A student's submission against an assignment, pointing at an attachment
/// held in external object storage. `assignment_id` is not checked against
/// the assignments collection; the store enforces no referential integrity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub assignment_id: ObjectId,
    pub student_email: String,
    pub course_id: ObjectId,
    pub section: String,
    pub file_url: String,
    pub file_type: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub submitted_at: DateTime<Utc>,
}

/// Insert shape for a [`Submission`].
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub assignment_id: ObjectId,
    pub student_email: String,
    pub course_id: ObjectId,
    pub section: String,
    pub file_url: String,
    pub file_type: String,
    pub submitted_at: DateTime<Utc>,
}
