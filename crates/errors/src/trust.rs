//! Signature and license gating error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrustError {
    #[error("GPG signed package could not be verified: {package_id}")]
    SignatureRequired { package_id: String },

    #[error("GPG key {key_id} not recognised for package_id {package_id}")]
    KeyNotRecognised { key_id: String, package_id: String },

    #[error("licence {eula_id} not accepted, cannot install {package_id}")]
    EulaRequired { eula_id: String, package_id: String },
}

impl UserFacingError for TrustError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::SignatureRequired { .. } => {
                Some("Import the repository signing key, then retry the install.")
            }
            Self::KeyNotRecognised { .. } => {
                Some("Accept the exact key id that was reported for this package.")
            }
            Self::EulaRequired { .. } => {
                Some("Review and accept the license agreement, then retry the install.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        !matches!(self, Self::KeyNotRecognised { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::SignatureRequired { .. } => "trust.signature_required",
            Self::KeyNotRecognised { .. } => "trust.key_not_recognised",
            Self::EulaRequired { .. } => "trust.eula_required",
        })
    }
}
