//! Repository registry error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RepoError {
    #[error("unknown repo: {id}")]
    UnknownRepository { id: String },

    #[error("duplicate repo id in configuration: {id}")]
    DuplicateRepository { id: String },

    #[error("repo id {id} is reserved for removable media")]
    ReservedRepository { id: String },
}
