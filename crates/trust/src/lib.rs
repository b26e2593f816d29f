#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Signature and license gating for package installs
//!
//! The gate holds process-wide acceptance state: verified signatures keyed
//! by `(sig type, key id, package id)` and accepted EULA ids. The state is
//! shared between the transaction running an install and the actions that
//! record acceptances, which may run on other tasks.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pkengine_errors::TrustError;
use pkengine_types::{
    EulaRequirement, PackageId, SigType, SignatureRequirement, TrustRequirements,
};
use serde::{Deserialize, Serialize};

/// Result of evaluating an install target against the gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateDecision {
    Proceed,
    SignatureRequired(SignatureRequirement),
    EulaRequired(EulaRequirement),
}

impl GateDecision {
    #[must_use]
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }

    /// Error reported to the caller when the install must stop here
    #[must_use]
    pub fn to_error(&self) -> Option<TrustError> {
        match self {
            Self::Proceed => None,
            Self::SignatureRequired(req) => Some(TrustError::SignatureRequired {
                package_id: req.package_id.to_string(),
            }),
            Self::EulaRequired(req) => Some(TrustError::EulaRequired {
                eula_id: req.eula_id.clone(),
                package_id: req.package_id.to_string(),
            }),
        }
    }
}

type SignatureKey = (SigType, String, PackageId);

#[derive(Debug, Default)]
struct GateState {
    pending_signatures: HashMap<PackageId, SignatureRequirement>,
    verified: HashSet<SignatureKey>,
    eula_requirements: HashMap<String, EulaRequirement>,
    accepted_eulas: HashSet<String>,
}

/// Shared trust state; clones refer to the same acceptance sets
#[derive(Debug, Clone, Default)]
pub struct TrustGate {
    state: Arc<RwLock<GateState>>,
}

impl TrustGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, GateState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GateState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a signature requirement was raised for this package and
    /// has not been satisfied yet
    #[must_use]
    pub fn requires_signature(&self, package_id: &PackageId) -> bool {
        self.read().pending_signatures.contains_key(package_id)
    }

    #[must_use]
    pub fn is_signature_verified(&self, requirement: &SignatureRequirement) -> bool {
        self.read().verified.contains(&(
            requirement.sig_type,
            requirement.key_id.clone(),
            requirement.package_id.clone(),
        ))
    }

    /// Remember a requirement so a later acceptance can be matched against it
    pub fn raise_signature_requirement(&self, requirement: SignatureRequirement) {
        tracing::debug!(
            package = %requirement.package_id,
            key_id = %requirement.key_id,
            "signature requirement raised"
        );
        self.write()
            .pending_signatures
            .insert(requirement.package_id.clone(), requirement);
    }

    /// Record that the caller trusts `key_id` for `package_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TrustError::KeyNotRecognised`] unless the type, key id and
    /// package all match a previously raised requirement.
    pub fn accept_signature(
        &self,
        sig_type: SigType,
        key_id: &str,
        package_id: &PackageId,
    ) -> Result<(), TrustError> {
        let mut state = self.write();
        let matches = state
            .pending_signatures
            .get(package_id)
            .is_some_and(|req| req.is_satisfied_by(sig_type, key_id, package_id));

        if !matches {
            tracing::warn!(%package_id, key_id, "signature acceptance rejected");
            return Err(TrustError::KeyNotRecognised {
                key_id: key_id.to_string(),
                package_id: package_id.to_string(),
            });
        }

        state.pending_signatures.remove(package_id);
        state
            .verified
            .insert((sig_type, key_id.to_string(), package_id.clone()));
        tracing::info!(%package_id, key_id, "signature accepted");
        Ok(())
    }

    #[must_use]
    pub fn is_eula_accepted(&self, eula_id: &str) -> bool {
        self.read().accepted_eulas.contains(eula_id)
    }

    pub fn record_eula_requirement(&self, requirement: EulaRequirement) {
        tracing::debug!(
            package = %requirement.package_id,
            eula_id = %requirement.eula_id,
            "eula requirement recorded"
        );
        self.write()
            .eula_requirements
            .insert(requirement.eula_id.clone(), requirement);
    }

    /// Mark an EULA as accepted for the lifetime of this gate.
    ///
    /// Returns whether a matching requirement had been recorded; the
    /// acceptance is stored either way.
    pub fn accept_eula(&self, eula_id: &str) -> bool {
        let mut state = self.write();
        let known = state.eula_requirements.contains_key(eula_id);
        if !known {
            tracing::warn!(eula_id, "accepting eula that was never requested");
        }
        state.accepted_eulas.insert(eula_id.to_string());
        known
    }

    /// Run the install gate for one package.
    ///
    /// The signature is checked first; the EULA is only looked at once the
    /// signature is verified. Raised requirements are remembered so the
    /// matching acceptance can be recorded later.
    #[must_use]
    pub fn evaluate(&self, requirements: &TrustRequirements) -> GateDecision {
        if let Some(signature) = &requirements.signature {
            if !self.is_signature_verified(signature) {
                self.raise_signature_requirement(signature.clone());
                return GateDecision::SignatureRequired(signature.clone());
            }
        }

        if let Some(eula) = &requirements.eula {
            if !self.is_eula_accepted(&eula.eula_id) {
                self.record_eula_requirement(eula.clone());
                return GateDecision::EulaRequired(eula.clone());
            }
        }

        GateDecision::Proceed
    }
}
