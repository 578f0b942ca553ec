use std::sync::Arc;

use service::StudentRegistry;

/// Shared handler state, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<StudentRegistry>,
    /// Largest accepted photo upload, in bytes.
    pub max_upload_bytes: usize,
}
