//! Filesystem artifact writer

use std::path::{Path, PathBuf};

use pkengine_errors::{Error, StoreError};
use tokio::fs;

use crate::{Artifact, ArtifactWriter};

/// Writes artifacts as plain files into an existing directory
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactWriter;

impl FsArtifactWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ArtifactWriter for FsArtifactWriter {
    async fn write(&self, directory: &Path, artifact: &Artifact) -> Result<PathBuf, Error> {
        let is_dir = fs::metadata(directory)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(StoreError::DestinationMissing {
                path: directory.display().to_string(),
            }
            .into());
        }

        let path = directory.join(&artifact.file_name);
        fs::write(&path, &artifact.bytes)
            .await
            .map_err(|e| StoreError::ArtifactWrite {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        tracing::debug!(path = %path.display(), bytes = artifact.bytes.len(), "artifact written");
        Ok(path)
    }
}
