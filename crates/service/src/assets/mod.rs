//! Photo storage for student records.

pub mod photo_store;

use async_trait::async_trait;
use models::student::StudentId;

use crate::errors::ServiceError;

/// One photo per student, addressed only by student id.
/// Implementations can be filesystem-backed or in-memory for tests.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Public reference recorded as the student's `ImagePath`.
    fn path_for(&self, id: StudentId) -> String;

    /// Write `bytes` for `id`, replacing any existing photo. Returns `path_for(id)`.
    async fn put(&self, id: StudentId, bytes: &[u8]) -> Result<String, ServiceError>;
}

pub use photo_store::FsPhotoStore;
