//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Ensure the writable directories exist; warn if the static asset directory is missing.
pub async fn ensure_env(static_dir: &Path, writable_dirs: &[&Path]) -> anyhow::Result<()> {
    if tokio::fs::metadata(static_dir).await.is_err() {
        warn!(static_dir = %static_dir.display(), "static assets directory not found; static assets may 404");
    }
    for dir in writable_dirs {
        if dir.as_os_str().is_empty() {
            continue;
        }
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_writable_dirs() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("common_env_{}", uuid::Uuid::new_v4()));
        let uploads = root.join("uploads");
        let data = root.join("data");
        ensure_env(&root.join("static"), &[uploads.as_path(), data.as_path(), Path::new("")]).await?;
        assert!(tokio::fs::metadata(&uploads).await?.is_dir());
        assert!(tokio::fs::metadata(&data).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
