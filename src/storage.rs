use crate::errors::UploadError;
use std::path::{Path, PathBuf};

/// Flat directory of stored images. Writes are plain overwrites, so two
/// uploads with the same name race and the last one wins.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, UploadError> {
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| UploadError::StorageFailure(format!("{}: {e}", path.display())))?;
        Ok(path)
    }
}
