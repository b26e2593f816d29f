//! Install operations and the trust gate step

use std::path::PathBuf;

use pkengine_errors::{Error, PackageError};
use pkengine_events::EventEmitter;
use pkengine_trust::GateDecision;
use pkengine_types::{PackageId, SigType, StatusKind};

use crate::phase::{Download, PhaseCx, Ramp, Subjects};
use crate::plan::{require_ids, Plan};
use crate::schedule::INSTALL;

/// Check every package an install will touch against the trust gate.
///
/// Stops at the first package that is not cleared, after announcing what
/// the caller must accept.
pub(crate) fn gate(cx: &PhaseCx<'_>, targets: &[PackageId]) -> Result<(), Error> {
    for id in targets {
        let decision = cx
            .shared
            .trust
            .evaluate(&cx.store().trust_requirements(id));
        let Some(err) = decision.to_error() else {
            continue;
        };

        tracing::info!(package = %id, error = %err, "install blocked by trust gate");
        match decision {
            GateDecision::SignatureRequired(requirement) => {
                cx.emitter.emit_repo_signature_required(requirement);
            }
            GateDecision::EulaRequired(requirement) => {
                cx.emitter.emit_eula_required(requirement);
            }
            GateDecision::Proceed => {}
        }
        return Err(err.into());
    }
    Ok(())
}

pub(crate) fn install_packages(cx: &PhaseCx<'_>, package_ids: &[String]) -> Result<Plan, Error> {
    let ids = require_ids(package_ids)?;
    let plan = cx.store().install_plan(&ids)?;
    tracing::debug!(
        targets = plan.targets.len(),
        derived = plan.derived.len(),
        "install planned"
    );

    // pulled-in packages are installed too, so they clear the gate as well
    let gated = plan
        .targets
        .iter()
        .chain(&plan.derived)
        .map(|record| record.id.clone())
        .collect();
    let ramp = Ramp::new(
        "install",
        &INSTALL,
        Subjects {
            targets: plan.targets,
            derived: plan.derived,
            items: Vec::new(),
        },
        cx.timing().install(),
    );
    Ok(Plan::single(ramp).gated(gated))
}

/// Record acceptance of a previously raised signature requirement
pub(crate) fn install_signature(
    cx: &PhaseCx<'_>,
    sig_type: SigType,
    key_id: &str,
    package_id: &str,
) -> Result<Plan, Error> {
    let id = PackageId::parse(package_id)?;
    cx.emitter.emit_status(StatusKind::Install);
    cx.shared.trust.accept_signature(sig_type, key_id, &id)?;
    Ok(Plan::empty())
}

pub(crate) fn accept_eula(cx: &PhaseCx<'_>, eula_id: &str) -> Plan {
    if cx.shared.trust.accept_eula(eula_id) {
        tracing::info!(eula_id, "eula accepted");
    }
    Plan::empty()
}

/// Local file installs are acknowledged without touching the store
pub(crate) fn install_files(cx: &PhaseCx<'_>, trusted: bool, paths: &[PathBuf]) -> Plan {
    cx.emitter.emit_status(StatusKind::Install);
    for path in paths {
        tracing::info!(path = %path.display(), trusted, "install file requested");
    }
    Plan::empty()
}

/// Write the artifacts of the named packages into `directory`
pub(crate) fn download_packages(
    cx: &PhaseCx<'_>,
    package_ids: &[String],
    directory: PathBuf,
) -> Result<Plan, Error> {
    let ids = require_ids(package_ids)?;
    let records = ids
        .iter()
        .map(|id| {
            cx.store().lookup(id).ok_or_else(|| {
                Error::from(PackageError::NotFound {
                    package_id: id.to_string(),
                })
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(directory = %directory.display(), count = records.len(), "downloading");
    cx.emitter.emit_status(StatusKind::Download);
    Ok(Plan::single(Download::new(records, directory)))
}
