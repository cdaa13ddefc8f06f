//! crates/classline_core/src/ports.rs
//!
//! Defines the service contracts (traits) at the boundary of the core.
//! These traits keep the core independent of the concrete document store
//! and object-storage implementations living in the api service.

use async_trait::async_trait;
use bson::oid::ObjectId;
use bytes::Bytes;

use crate::domain::{
    Account, AccountRole, Assignment, NewAccount, NewAssignment, NewSubmission, Submission,
};

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// Errors surfaced by the document store adapters.
///
/// `DuplicateKey` is distinguished because the registration flow relies on
/// the store's unique index as the authoritative conflict signal; everything
/// else collapses into `Backend`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key for {0}")]
    DuplicateKey(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// A convenience type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error surfaced by the attachment storage adapter.
#[derive(Debug, thiserror::Error)]
#[error("attachment storage error: {0}")]
pub struct UploadError(pub String);

//=========================================================================================
// Attachment Transfer Types
//=========================================================================================

/// A file received from a client, ready to hand to attachment storage.
#[derive(Debug, Clone)]
pub struct AttachmentFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Result of storing an attachment: a retrievable URL, the stored MIME type,
/// and the storage key needed to delete the object again.
#[derive(Debug, Clone)]
pub struct StoredAttachment {
    pub key: String,
    pub url: String,
    pub mime_type: String,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts a new account. Must fail with [`StoreError::DuplicateKey`]
    /// when the email already exists, even if a pre-check missed it.
    async fn insert_account(&self, account: NewAccount) -> StoreResult<Account>;

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Lists all accounts with the given role, in store-native order.
    async fn list_accounts(&self, role: AccountRole) -> StoreResult<Vec<Account>>;
}

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn insert_assignment(&self, assignment: NewAssignment) -> StoreResult<Assignment>;

    /// Lists assignments matching the course/section pair exactly, ordered
    /// by creation time, newest first.
    async fn list_assignments(
        &self,
        course_id: ObjectId,
        section: &str,
    ) -> StoreResult<Vec<Assignment>>;

    async fn insert_submission(&self, submission: NewSubmission) -> StoreResult<Submission>;

    /// Lists submissions matching all three filters, in store-native order.
    async fn list_submissions(
        &self,
        student_email: &str,
        course_id: ObjectId,
        section: &str,
    ) -> StoreResult<Vec<Submission>>;
}

#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Stores a file in external object storage and returns its locator.
    async fn store(&self, file: AttachmentFile) -> Result<StoredAttachment, UploadError>;

    /// Deletes a previously stored attachment by its storage key.
    async fn delete(&self, key: &str) -> Result<(), UploadError>;
}
