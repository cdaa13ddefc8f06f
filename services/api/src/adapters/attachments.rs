//! services/api/src/adapters/attachments.rs
//!
//! Object-storage adapter implementing the `AttachmentStore` port over S3.
//! Submission attachments are stored under uuid-based keys and served from
//! the public bucket URL.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use classline_core::ports::{AttachmentFile, AttachmentStore, StoredAttachment, UploadError};

/// An attachment adapter that implements the `AttachmentStore` port.
#[derive(Clone)]
pub struct S3AttachmentStore {
    client: S3Client,
    bucket: String,
}

impl S3AttachmentStore {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl AttachmentStore for S3AttachmentStore {
    async fn store(&self, file: AttachmentFile) -> Result<StoredAttachment, UploadError> {
        // Get the file extension from the filename.
        let extension = file.file_name.rsplit('.').next().unwrap_or("bin");
        let key = format!("submissions/{}.{}", uuid::Uuid::new_v4(), extension);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.bytes.to_vec()))
            .content_type(&file.content_type)
            .send()
            .await
            .map_err(|e| UploadError(format!("failed to upload to S3: {}", e)))?;

        let url = format!("https://{}.s3.amazonaws.com/{}", self.bucket, key);

        Ok(StoredAttachment {
            key,
            url,
            mime_type: file.content_type,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), UploadError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| UploadError(format!("failed to delete from S3: {}", e)))?;
        Ok(())
    }
}
