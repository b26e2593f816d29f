//! Package identity error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PackageError {
    #[error("invalid package id '{input}': expected 4 fields, found {found}")]
    WrongFieldCount { input: String, found: usize },

    #[error("invalid package id '{input}': empty {field}")]
    EmptyField { input: String, field: String },

    #[error("package not found: {package_id}")]
    NotFound { package_id: String },
}

impl PackageError {
    /// The raw text that failed to parse, when there is one
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::WrongFieldCount { input, .. } | Self::EmptyField { input, .. } => input,
            Self::NotFound { package_id } => package_id,
        }
    }
}
