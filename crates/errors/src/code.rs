//! Caller-visible error codes carried by `error` events

use std::fmt;

/// Error code surfaced to the caller of a transaction.
///
/// This is the closed set a remote dispatcher can rely on; internal errors
/// are folded into one of these through [`crate::Error::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ErrorCode {
    NoNetwork,
    GpgFailure,
    NoLicenseAgreement,
    TransactionCancelled,
    PackageIdInvalid,
    RepoNotFound,
    InternalError,
}

impl ErrorCode {
    /// Stable wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoNetwork => "no-network",
            Self::GpgFailure => "gpg-failure",
            Self::NoLicenseAgreement => "no-license-agreement",
            Self::TransactionCancelled => "transaction-cancelled",
            Self::PackageIdInvalid => "package-id-invalid",
            Self::RepoNotFound => "repo-not-found",
            Self::InternalError => "internal-error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
