//! services/api/src/services/assignments.rs
//!
//! The assignment lifecycle: creating and listing assignments, accepting
//! student submissions with an attachment, and listing submissions. Each
//! operation is a single validate -> (optional side effect) -> persist step;
//! there is no workflow state to track.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use classline_core::domain::{Assignment, NewAssignment, NewSubmission, Submission};
use classline_core::ports::{AssignmentStore, AttachmentFile, AttachmentStore};
use mongodb::bson::oid::ObjectId;
use tracing::warn;

use super::{require_field, ServiceError};

/// Raw input for creating an assignment. Presence validation happens in the
/// service so that missing fields surface as typed validation errors rather
/// than deserialization failures.
#[derive(Debug, Clone, Default)]
pub struct CreateAssignment {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub instructor_email: Option<String>,
    pub course_id: Option<String>,
    pub section: Option<String>,
}

/// Raw input for submitting against an assignment.
#[derive(Debug, Clone, Default)]
pub struct SubmitAssignment {
    pub assignment_id: Option<String>,
    pub student_email: Option<String>,
    pub course_id: Option<String>,
    pub section: Option<String>,
    pub file: Option<AttachmentFile>,
}

#[derive(Clone)]
pub struct AssignmentService {
    store: Arc<dyn AssignmentStore>,
    attachments: Arc<dyn AttachmentStore>,
}

impl AssignmentService {
    pub fn new(store: Arc<dyn AssignmentStore>, attachments: Arc<dyn AttachmentStore>) -> Self {
        Self { store, attachments }
    }

    /// Creates an assignment. An unparsable due date is rejected outright
    /// rather than stored as an invalid timestamp.
    pub async fn create_assignment(
        &self,
        input: CreateAssignment,
    ) -> Result<Assignment, ServiceError> {
        let title = require_field("title", input.title)?;
        let due_date = parse_due_date(&require_field("dueDate", input.due_date)?)?;
        let instructor_email = require_field("instructorEmail", input.instructor_email)?;
        let course_id = parse_reference_id("courseId", &require_field("courseId", input.course_id)?)?;
        let section = require_field("section", input.section)?;
        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let assignment = self
            .store
            .insert_assignment(NewAssignment {
                title,
                description,
                due_date,
                instructor_email,
                course_id,
                section,
                created_at: Utc::now(),
            })
            .await?;

        Ok(assignment)
    }

    /// Lists assignments for a course section, newest first.
    pub async fn list_assignments(
        &self,
        course_id: Option<String>,
        section: Option<String>,
    ) -> Result<Vec<Assignment>, ServiceError> {
        let course_id = parse_reference_id("courseId", &require_field("courseId", course_id)?)?;
        let section = require_field("section", section)?;
        Ok(self.store.list_assignments(course_id, &section).await?)
    }

    /// Accepts a student submission. The attachment is uploaded first; if the
    /// subsequent record write fails, the uploaded object is deleted again
    /// best-effort.
    pub async fn submit_assignment(
        &self,
        input: SubmitAssignment,
    ) -> Result<Submission, ServiceError> {
        let assignment_id =
            parse_reference_id("assignmentId", &require_field("assignmentId", input.assignment_id)?)?;
        let student_email = require_field("studentEmail", input.student_email)?;
        let course_id = parse_reference_id("courseId", &require_field("courseId", input.course_id)?)?;
        let section = require_field("section", input.section)?;
        let file = input.file.ok_or_else(|| ServiceError::missing("file"))?;

        let stored = self
            .attachments
            .store(file)
            .await
            .map_err(|e| ServiceError::Upload(e.to_string()))?;

        let inserted = self
            .store
            .insert_submission(NewSubmission {
                assignment_id,
                student_email,
                course_id,
                section,
                file_url: stored.url,
                file_type: stored.mime_type,
                submitted_at: Utc::now(),
            })
            .await;

        match inserted {
            Ok(submission) => Ok(submission),
            Err(store_err) => {
                if let Err(delete_err) = self.attachments.delete(&stored.key).await {
                    warn!(
                        key = %stored.key,
                        error = %delete_err,
                        "failed to delete orphaned attachment after store error"
                    );
                }
                Err(store_err.into())
            }
        }
    }

    /// Lists a student's submissions for a course section, store-native order.
    pub async fn list_submissions(
        &self,
        student_email: Option<String>,
        course_id: Option<String>,
        section: Option<String>,
    ) -> Result<Vec<Submission>, ServiceError> {
        let student_email = require_field("studentEmail", student_email)?;
        let course_id = parse_reference_id("courseId", &require_field("courseId", course_id)?)?;
        let section = require_field("section", section)?;
        Ok(self
            .store
            .list_submissions(&student_email, course_id, &section)
            .await?)
    }
}

/// Parses a due date from RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC).
fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(DateTime::from_naive_utc_and_offset(
            date.and_time(NaiveTime::MIN),
            Utc,
        ));
    }
    Err(ServiceError::Validation {
        field: "dueDate",
        reason: format!("'{}' is not a parsable date", raw),
    })
}

/// Coerces a client-supplied id into the store's reference-id type.
fn parse_reference_id(field: &'static str, raw: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(raw).map_err(|_| ServiceError::Validation {
        field,
        reason: "is not a valid id".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::Duration;
    use classline_core::ports::{StoreError, StoreResult, StoredAttachment, UploadError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockAssignmentStore {
        assignments: Mutex<Vec<Assignment>>,
        submissions: Mutex<Vec<Submission>>,
        insert_assignment_calls: AtomicUsize,
        list_submission_calls: AtomicUsize,
        fail_submission_insert: bool,
    }

    impl MockAssignmentStore {
        fn new() -> Self {
            Self {
                assignments: Mutex::new(Vec::new()),
                submissions: Mutex::new(Vec::new()),
                insert_assignment_calls: AtomicUsize::new(0),
                list_submission_calls: AtomicUsize::new(0),
                fail_submission_insert: false,
            }
        }

        fn failing_submission_inserts() -> Self {
            Self {
                fail_submission_insert: true,
                ..Self::new()
            }
        }

        fn seed_assignment(&self, course_id: ObjectId, section: &str, title: &str, created_at: DateTime<Utc>) {
            self.assignments.lock().unwrap().push(Assignment {
                id: ObjectId::new(),
                title: title.to_string(),
                description: None,
                due_date: created_at + Duration::days(7),
                instructor_email: "t@school.edu".to_string(),
                course_id,
                section: section.to_string(),
                created_at,
            });
        }
    }

    #[async_trait]
    impl AssignmentStore for MockAssignmentStore {
        async fn insert_assignment(&self, assignment: NewAssignment) -> StoreResult<Assignment> {
            self.insert_assignment_calls.fetch_add(1, Ordering::SeqCst);
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
            self.assignments.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn list_assignments(
            &self,
            course_id: ObjectId,
            section: &str,
        ) -> StoreResult<Vec<Assignment>> {
            let mut matching: Vec<Assignment> = self
                .assignments
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.course_id == course_id && a.section == section)
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(matching)
        }

        async fn insert_submission(&self, submission: NewSubmission) -> StoreResult<Submission> {
            if self.fail_submission_insert {
                return Err(StoreError::Backend("write failed".to_string()));
            }
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
            self.submissions.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn list_submissions(
            &self,
            student_email: &str,
            course_id: ObjectId,
            section: &str,
        ) -> StoreResult<Vec<Submission>> {
            self.list_submission_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .submissions
                .lock()
                .unwrap()
                .iter()
                .filter(|s| {
                    s.student_email == student_email
                        && s.course_id == course_id
                        && s.section == section
                })
                .cloned()
                .collect())
        }
    }

    struct MockAttachmentStore {
        store_calls: AtomicUsize,
        delete_calls: AtomicUsize,
        deleted_keys: Mutex<Vec<String>>,
        fail_store: bool,
    }

    impl MockAttachmentStore {
        fn new() -> Self {
            Self {
                store_calls: AtomicUsize::new(0),
                delete_calls: AtomicUsize::new(0),
                deleted_keys: Mutex::new(Vec::new()),
                fail_store: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_store: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl AttachmentStore for MockAttachmentStore {
        async fn store(&self, file: AttachmentFile) -> Result<StoredAttachment, UploadError> {
            self.store_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_store {
                return Err(UploadError("upstream unavailable".to_string()));
            }
            Ok(StoredAttachment {
                key: format!("submissions/{}", file.file_name),
                url: format!("https://media.example.com/submissions/{}", file.file_name),
                mime_type: file.content_type,
            })
        }

        async fn delete(&self, key: &str) -> Result<(), UploadError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.deleted_keys.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    fn service() -> (Arc<MockAssignmentStore>, Arc<MockAttachmentStore>, AssignmentService) {
        let store = Arc::new(MockAssignmentStore::new());
        let attachments = Arc::new(MockAttachmentStore::new());
        let svc = AssignmentService::new(store.clone(), attachments.clone());
        (store, attachments, svc)
    }

    fn valid_create(course_id: ObjectId) -> CreateAssignment {
        CreateAssignment {
            title: Some("HW1".to_string()),
            description: None,
            due_date: Some("2025-01-01".to_string()),
            instructor_email: Some("t@x.com".to_string()),
            course_id: Some(course_id.to_hex()),
            section: Some("A".to_string()),
        }
    }

    fn valid_submit(assignment_id: ObjectId, course_id: ObjectId) -> SubmitAssignment {
        SubmitAssignment {
            assignment_id: Some(assignment_id.to_hex()),
            student_email: Some("s@x.com".to_string()),
            course_id: Some(course_id.to_hex()),
            section: Some("A".to_string()),
            file: Some(AttachmentFile {
                file_name: "essay.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                bytes: Bytes::from_static(b"%PDF-1.4"),
            }),
        }
    }

    #[tokio::test]
    async fn created_assignment_round_trips_through_listing() {
        let (_, _, svc) = service();
        let course_id = ObjectId::new();
        let created = svc.create_assignment(valid_create(course_id)).await.unwrap();

        let listed = svc
            .list_assignments(Some(course_id.to_hex()), Some("A".to_string()))
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].title, "HW1");
        assert_eq!(listed[0].instructor_email, "t@x.com");
        assert_eq!(listed[0].section, "A");
        assert_eq!(listed[0].course_id, course_id);
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_exact_match() {
        let (store, _, svc) = service();
        let course_id = ObjectId::new();
        let t1 = Utc::now() - Duration::hours(2);
        let t2 = Utc::now() - Duration::hours(1);
        store.seed_assignment(course_id, "A", "older", t1);
        store.seed_assignment(course_id, "A", "newer", t2);
        store.seed_assignment(course_id, "B", "other section", t2);
        store.seed_assignment(ObjectId::new(), "A", "other course", t2);

        let listed = svc
            .list_assignments(Some(course_id.to_hex()), Some("A".to_string()))
            .await
            .unwrap();

        let titles: Vec<&str> = listed.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn create_with_missing_field_writes_nothing() {
        let (store, _, svc) = service();
        let course_id = ObjectId::new();

        let variants: Vec<(&str, CreateAssignment)> = vec![
            ("title", CreateAssignment { title: None, ..valid_create(course_id) }),
            ("dueDate", CreateAssignment { due_date: None, ..valid_create(course_id) }),
            (
                "instructorEmail",
                CreateAssignment { instructor_email: None, ..valid_create(course_id) },
            ),
            ("courseId", CreateAssignment { course_id: None, ..valid_create(course_id) }),
            ("section", CreateAssignment { section: Some("  ".to_string()), ..valid_create(course_id) }),
        ];

        for (missing, input) in variants {
            let result = svc.create_assignment(input).await;
            match result {
                Err(ServiceError::Validation { field, .. }) => assert_eq!(field, missing),
                other => panic!("expected validation error for {}, got {:?}", missing, other),
            }
        }
        assert_eq!(store.insert_assignment_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unparsable_due_date_is_rejected() {
        let (store, _, svc) = service();
        let input = CreateAssignment {
            due_date: Some("next tuesday".to_string()),
            ..valid_create(ObjectId::new())
        };
        let result = svc.create_assignment(input).await;
        assert!(matches!(
            result,
            Err(ServiceError::Validation { field: "dueDate", .. })
        ));
        assert_eq!(store.insert_assignment_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rfc3339_due_date_is_accepted() {
        let (_, _, svc) = service();
        let input = CreateAssignment {
            due_date: Some("2025-01-01T17:30:00Z".to_string()),
            ..valid_create(ObjectId::new())
        };
        let created = svc.create_assignment(input).await.unwrap();
        assert_eq!(created.due_date.to_rfc3339(), "2025-01-01T17:30:00+00:00");
    }

    #[tokio::test]
    async fn malformed_course_id_is_rejected() {
        let (_, _, svc) = service();
        let input = CreateAssignment {
            course_id: Some("not-an-object-id".to_string()),
            ..valid_create(ObjectId::new())
        };
        let result = svc.create_assignment(input).await;
        assert!(matches!(
            result,
            Err(ServiceError::Validation { field: "courseId", .. })
        ));
    }

    #[tokio::test]
    async fn listing_requires_both_filters() {
        let (_, _, svc) = service();
        let result = svc.list_assignments(Some(ObjectId::new().to_hex()), None).await;
        assert!(matches!(
            result,
            Err(ServiceError::Validation { field: "section", .. })
        ));
    }

    #[tokio::test]
    async fn submission_without_file_never_reaches_the_uploader() {
        let (store, attachments, svc) = service();
        let input = SubmitAssignment {
            file: None,
            ..valid_submit(ObjectId::new(), ObjectId::new())
        };
        let result = svc.submit_assignment(input).await;
        assert!(matches!(
            result,
            Err(ServiceError::Validation { field: "file", .. })
        ));
        assert_eq!(attachments.store_calls.load(Ordering::SeqCst), 0);
        assert!(store.submissions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_submission_carries_the_stored_locator() {
        let (store, _, svc) = service();
        let assignment_id = ObjectId::new();
        let course_id = ObjectId::new();

        let submission = svc
            .submit_assignment(valid_submit(assignment_id, course_id))
            .await
            .unwrap();

        assert_eq!(submission.assignment_id, assignment_id);
        assert_eq!(submission.file_url, "https://media.example.com/submissions/essay.pdf");
        assert_eq!(submission.file_type, "application/pdf");
        assert_eq!(store.submissions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upload_failure_propagates_and_writes_nothing() {
        let store = Arc::new(MockAssignmentStore::new());
        let attachments = Arc::new(MockAttachmentStore::failing());
        let svc = AssignmentService::new(store.clone(), attachments.clone());

        let result = svc
            .submit_assignment(valid_submit(ObjectId::new(), ObjectId::new()))
            .await;

        assert!(matches!(result, Err(ServiceError::Upload(_))));
        assert!(store.submissions.lock().unwrap().is_empty());
        assert_eq!(attachments.delete_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_record_write_deletes_the_uploaded_attachment() {
        let store = Arc::new(MockAssignmentStore::failing_submission_inserts());
        let attachments = Arc::new(MockAttachmentStore::new());
        let svc = AssignmentService::new(store.clone(), attachments.clone());

        let result = svc
            .submit_assignment(valid_submit(ObjectId::new(), ObjectId::new()))
            .await;

        assert!(matches!(result, Err(ServiceError::Store(_))));
        assert_eq!(attachments.delete_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            attachments.deleted_keys.lock().unwrap().as_slice(),
            ["submissions/essay.pdf"]
        );
    }

    #[tokio::test]
    async fn listing_submissions_requires_all_filters() {
        let (store, _, svc) = service();
        let result = svc
            .list_submissions(Some("s@x.com".to_string()), Some(ObjectId::new().to_hex()), None)
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::Validation { field: "section", .. })
        ));
        assert_eq!(store.list_submission_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn listing_submissions_matches_exactly() {
        let (_, _, svc) = service();
        let assignment_id = ObjectId::new();
        let course_id = ObjectId::new();
        svc.submit_assignment(valid_submit(assignment_id, course_id))
            .await
            .unwrap();
        svc.submit_assignment(SubmitAssignment {
            student_email: Some("other@x.com".to_string()),
            ..valid_submit(assignment_id, course_id)
        })
        .await
        .unwrap();

        let listed = svc
            .list_submissions(
                Some("s@x.com".to_string()),
                Some(course_id.to_hex()),
                Some("A".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].student_email, "s@x.com");
    }
}
