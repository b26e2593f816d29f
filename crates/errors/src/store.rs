//! Resolvable store and artifact writer error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum StoreError {
    #[error("catalogue parse error: {message}")]
    CatalogParse { message: String },

    #[error("no artifact available for {package_id}")]
    ArtifactMissing { package_id: String },

    #[error("failed to write artifact {path}: {message}")]
    ArtifactWrite { path: String, message: String },

    #[error("destination directory not found: {path}")]
    DestinationMissing { path: String },
}
