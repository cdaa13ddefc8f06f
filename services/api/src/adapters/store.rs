//! services/api/src/adapters/store.rs
//!
//! This module contains the document store adapter, which is the concrete
//! implementation of the `AccountStore` and `AssignmentStore` ports from the
//! `core` crate. It handles all interactions with MongoDB through the
//! official driver.

use async_trait::async_trait;
use classline_core::domain::{
    Account, AccountRole, Assignment, NewAccount, NewAssignment, NewSubmission, Submission,
};
use classline_core::ports::{AccountStore, AssignmentStore, StoreError, StoreResult};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};

const ACCOUNTS_COLLECTION: &str = "accounts";
const ASSIGNMENTS_COLLECTION: &str = "assignments";
const SUBMISSIONS_COLLECTION: &str = "submissions";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A document store adapter over typed MongoDB collection handles.
#[derive(Clone)]
pub struct MongoStore {
    accounts: Collection<Account>,
    assignments: Collection<Assignment>,
    submissions: Collection<Submission>,
}

impl MongoStore {
    /// Connects to the database and verifies the connection with a ping.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(db_name);
        db.run_command(doc! { "ping": 1 }).await?;
        Ok(Self::new(db))
    }

    pub fn new(db: Database) -> Self {
        Self {
            accounts: db.collection(ACCOUNTS_COLLECTION),
            assignments: db.collection(ASSIGNMENTS_COLLECTION),
            submissions: db.collection(SUBMISSIONS_COLLECTION),
        }
    }

    /// Creates the indexes the services rely on at startup.
    ///
    /// The unique index on account email is the authoritative guard against
    /// concurrent duplicate registrations; the service-level existence check
    /// is advisory only.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let email_unique = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.accounts.create_index(email_unique).await?;
        Ok(())
    }
}

/// Whether a driver error is a unique-index violation (duplicate key).
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_err)) if write_err.code == 11000
    )
}

//=========================================================================================
// `AccountStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AccountStore for MongoStore {
    async fn insert_account(&self, account: NewAccount) -> StoreResult<Account> {
        let record = Account {
            id: ObjectId::new(),
            email: account.email,
            role: account.role,
            status: account.status,
            created_at: account.created_at,
        };
        self.accounts.insert_one(&record).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StoreError::DuplicateKey("email".to_string())
            } else {
                StoreError::Backend(e.to_string())
            }
        })?;
        Ok(record)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        self.accounts
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn list_accounts(&self, role: AccountRole) -> StoreResult<Vec<Account>> {
        let cursor = self
            .accounts
            .find(doc! { "role": role.as_str() })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

//=========================================================================================
// `AssignmentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AssignmentStore for MongoStore {
    async fn insert_assignment(&self, assignment: NewAssignment) -> StoreResult<Assignment> {
        let record = Assignment {
            id: ObjectId::new(),
            title: assignment.title,
            description: assignment.description,
            due_date: assignment.due_date,
            instructor_email: assignment.instructor_email,
            course_id: assignment.course_id,
            section: assignment.section,
            created_at: assignment.created_at,
        };
        self.assignments
            .insert_one(&record)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(record)
    }

    async fn list_assignments(
        &self,
        course_id: ObjectId,
        section: &str,
    ) -> StoreResult<Vec<Assignment>> {
        let cursor = self
            .assignments
            .find(doc! { "course_id": course_id, "section": section })
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn insert_submission(&self, submission: NewSubmission) -> StoreResult<Submission> {
        let record = Submission {
            id: ObjectId::new(),
            assignment_id: submission.assignment_id,
            student_email: submission.student_email,
            course_id: submission.course_id,
            section: submission.section,
            file_url: submission.file_url,
            file_type: submission.file_type,
            submitted_at: submission.submitted_at,
        };
        self.submissions
            .insert_one(&record)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(record)
    }

    async fn list_submissions(
        &self,
        student_email: &str,
        course_id: ObjectId,
        section: &str,
    ) -> StoreResult<Vec<Submission>> {
        let filter = doc! {
            "student_email": student_email,
            "course_id": course_id,
            "section": section,
        };
        let cursor = self
            .submissions
            .find(filter)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}
