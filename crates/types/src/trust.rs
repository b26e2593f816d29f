//! Signature and license requirements raised by install transactions

use crate::PackageId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signature scheme of a repository key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigType {
    Gpg,
}

impl fmt::Display for SigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpg => f.write_str("gpg"),
        }
    }
}

/// Raised when a package's signature has not been verified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRequirement {
    pub package_id: PackageId,
    pub repository_name: String,
    pub key_url: String,
    pub key_userid: String,
    pub key_id: String,
    pub key_fingerprint: String,
    pub key_timestamp: String,
    pub sig_type: SigType,
}

impl SignatureRequirement {
    /// Whether an acceptance names exactly this requirement
    #[must_use]
    pub fn is_satisfied_by(&self, sig_type: SigType, key_id: &str, package_id: &PackageId) -> bool {
        self.sig_type == sig_type && self.key_id == key_id && &self.package_id == package_id
    }
}

/// Raised when a package ships a license that has not been accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EulaRequirement {
    pub eula_id: String,
    pub package_id: PackageId,
    pub vendor_name: String,
    pub license_agreement: String,
}

/// Checks an install of one package must pass, signature first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustRequirements {
    pub signature: Option<SignatureRequirement>,
    pub eula: Option<EulaRequirement>,
}

impl TrustRequirements {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signature.is_none() && self.eula.is_none()
    }
}
