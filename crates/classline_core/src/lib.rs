pub mod domain;
pub mod ports;

pub use domain::{
    Account, AccountRole, AccountStatus, Assignment, NewAccount, NewAssignment, NewSubmission,
    Submission,
};
pub use ports::{
    AccountStore, AssignmentStore, AttachmentFile, AttachmentStore, StoreError, StoreResult,
    StoredAttachment, UploadError,
};
