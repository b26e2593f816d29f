#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the pkengine transaction core
//!
//! This crate provides fine-grained error types organized by domain.
//! Every error folds into exactly one caller-visible [`ErrorCode`], which is
//! what the event stream reports; the richer types stay inside the engine
//! and the CLI.

use std::borrow::Cow;

use thiserror::Error;

pub mod code;
pub mod config;
pub mod ops;
pub mod package;
pub mod repo;
pub mod store;
pub mod trust;

// Re-export all error types at the root
pub use code::ErrorCode;
pub use config::ConfigError;
pub use ops::OpsError;
pub use package::PackageError;
pub use repo::RepoError;
pub use store::StoreError;
pub use trust::TrustError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("package error: {0}")]
    Package(#[from] PackageError),

    #[error("trust error: {0}")]
    Trust(#[from] TrustError),

    #[error("repository error: {0}")]
    Repo(#[from] RepoError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("ops error: {0}")]
    Ops(#[from] OpsError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            message: err.to_string(),
            path: Some(path.into()),
        }
    }

    /// Map this error onto the code reported in the event stream
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Package(PackageError::NotFound { .. })
            | Error::Store(_)
            | Error::Config(_)
            | Error::Internal(_)
            | Error::Io { .. } => ErrorCode::InternalError,
            Error::Package(_) => ErrorCode::PackageIdInvalid,
            Error::Trust(TrustError::EulaRequired { .. }) => ErrorCode::NoLicenseAgreement,
            Error::Trust(_) => ErrorCode::GpgFailure,
            Error::Repo(_) => ErrorCode::RepoNotFound,
            Error::Ops(OpsError::NoNetwork { .. }) => ErrorCode::NoNetwork,
            Error::Ops(OpsError::TransactionCancelled) => ErrorCode::TransactionCancelled,
            Error::Ops(_) => ErrorCode::InternalError,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(ConfigError::ParseError {
            message: err.to_string(),
        })
    }
}

/// Result type alias for pkengine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for analytics / structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Trust(err) => err.user_message(),
            Error::Ops(err) => err.user_message(),
            Error::Config(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Trust(err) => err.user_hint(),
            Error::Ops(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Package(_) => Some("Package ids have the form name;version;arch;data."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Trust(err) => err.is_retryable(),
            Error::Ops(err) => err.is_retryable(),
            Error::Io { .. } => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Trust(err) => err.user_code(),
            Error::Ops(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Package(_) => Some("error.package_id"),
            Error::Repo(_) => Some("error.repo"),
            Error::Store(_) => Some("error.store"),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
