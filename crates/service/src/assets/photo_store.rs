use std::path::{Path, PathBuf};

use async_trait::async_trait;
use models::student::StudentId;
use tokio::fs;
use tracing::debug;

use super::PhotoStore;
use crate::errors::ServiceError;

/// Writes photos to `<dir>/<id>.<ext>`.
///
/// The reference handed back is `uploads/<id>.<ext>`, matching the `/uploads`
/// route that serves the directory.
#[derive(Clone, Debug)]
pub struct FsPhotoStore {
    dir: PathBuf,
    extension: String,
}

impl FsPhotoStore {
    pub fn new<P: Into<PathBuf>>(dir: P, extension: impl Into<String>) -> Self {
        Self { dir: dir.into(), extension: extension.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(&self, id: StudentId) -> String {
        format!("{id}.{}", self.extension)
    }
}

#[async_trait]
impl PhotoStore for FsPhotoStore {
    fn path_for(&self, id: StudentId) -> String {
        format!("uploads/{}", self.file_name(id))
    }

    async fn put(&self, id: StudentId, bytes: &[u8]) -> Result<String, ServiceError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ServiceError::io(format!("create {}", self.dir.display()), e))?;
        let target = self.dir.join(self.file_name(id));
        fs::write(&target, bytes)
            .await
            .map_err(|e| ServiceError::io(format!("write {}", target.display()), e))?;
        debug!(id, path = %target.display(), size = bytes.len(), "photo stored");
        Ok(self.path_for(id))
    }
}
