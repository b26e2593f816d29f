//! Validation of a request into an execution plan

use pkengine_errors::{Error, OpsError};
use pkengine_store::SearchKind;
use pkengine_types::PackageId;

use crate::phase::{Phase, PhaseCx};
use crate::{install, query, repository, uninstall, update, Operation};

/// What a validated transaction will do
#[derive(Debug, Default)]
pub(crate) struct Plan {
    /// Install targets checked by the trust gate before executing
    pub gate: Vec<PackageId>,
    pub phases: Vec<Box<dyn Phase>>,
}

impl Plan {
    /// A transaction with nothing left to execute
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(phase: impl Phase + 'static) -> Self {
        Self::empty().then(phase)
    }

    #[must_use]
    pub fn then(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    #[must_use]
    pub fn gated(mut self, targets: Vec<PackageId>) -> Self {
        self.gate = targets;
        self
    }
}

/// Parse caller-supplied ids; each entry may itself be a `^`-joined list.
///
/// A request made only of blank entries names nothing. A blank entry next
/// to real ids is a malformed id.
pub(crate) fn parse_ids(raw: &[String]) -> Result<Vec<PackageId>, Error> {
    if raw.iter().all(String::is_empty) {
        return Ok(Vec::new());
    }
    let mut ids = Vec::with_capacity(raw.len());
    for entry in raw {
        let parsed = if entry.is_empty() {
            vec![PackageId::parse(entry)?]
        } else {
            PackageId::parse_list(entry)?
        };
        ids.extend(parsed);
    }
    Ok(ids)
}

/// Like [`parse_ids`], rejecting an empty request
pub(crate) fn require_ids(raw: &[String]) -> Result<Vec<PackageId>, Error> {
    let ids = parse_ids(raw)?;
    if ids.is_empty() {
        return Err(OpsError::NoPackagesSpecified.into());
    }
    Ok(ids)
}

/// Validate `operation`, emitting its opening events, and build its plan
pub(crate) fn prepare(cx: &PhaseCx<'_>, operation: Operation) -> Result<Plan, Error> {
    match operation {
        Operation::Resolve { filters, names } => Ok(query::resolve(cx, filters, names)),
        Operation::SearchName { filters, text } => {
            Ok(query::search(cx, SearchKind::Name, filters, text))
        }
        Operation::SearchDetails { filters, text } => {
            Ok(query::search(cx, SearchKind::Details, filters, text))
        }
        Operation::SearchGroup { filters, text } => {
            Ok(query::search(cx, SearchKind::Group, filters, text))
        }
        Operation::SearchFile { filters, text } => {
            Ok(query::search(cx, SearchKind::File, filters, text))
        }
        Operation::GetDepends {
            filters,
            package_ids,
            recursive,
        } => query::depends(cx, filters, &package_ids, recursive),
        Operation::GetRequires {
            filters,
            package_ids,
            recursive,
        } => query::requires(cx, filters, &package_ids, recursive),
        Operation::GetDetails { package_ids } => query::details(cx, &package_ids),
        Operation::GetFiles { package_ids } => query::files(cx, &package_ids),
        Operation::GetPackages { filters } => Ok(query::packages(cx, filters)),
        Operation::GetDistroUpgrades => Ok(query::distro_upgrades(cx)),
        Operation::WhatProvides {
            filters,
            kind,
            text,
        } => Ok(query::what_provides(cx, filters, kind, text)),
        Operation::GetUpdates { filters } => update::get_updates(cx, filters),
        Operation::GetUpdateDetail { package_ids } => update::get_update_detail(cx, &package_ids),
        Operation::UpdatePackages { package_ids } => update::update_packages(cx, &package_ids),
        Operation::UpdateSystem => update::update_system(cx),
        Operation::RefreshCache { force } => Ok(update::refresh_cache(cx, force)),
        Operation::Rollback { transaction_id } => Ok(update::rollback(cx, &transaction_id)),
        Operation::InstallPackages { package_ids } => install::install_packages(cx, &package_ids),
        Operation::InstallSignature {
            sig_type,
            key_id,
            package_id,
        } => install::install_signature(cx, sig_type, &key_id, &package_id),
        Operation::AcceptEula { eula_id } => Ok(install::accept_eula(cx, &eula_id)),
        Operation::InstallFiles { trusted, paths } => Ok(install::install_files(cx, trusted, &paths)),
        Operation::DownloadPackages {
            package_ids,
            directory,
        } => install::download_packages(cx, &package_ids, directory),
        Operation::RemovePackages {
            package_ids,
            allow_deps,
            autoremove,
        } => uninstall::remove_packages(cx, &package_ids, allow_deps, autoremove),
        Operation::GetRepoList { filters } => Ok(repository::repo_list(cx, filters)),
        Operation::RepoEnable { repo_id, enabled } => {
            Ok(repository::repo_enable(cx, repo_id, enabled))
        }
        Operation::RepoSetData {
            repo_id,
            parameter,
            value,
        } => Ok(repository::repo_set_data(cx, repo_id, parameter, value)),
        Operation::AddMediaRepository { location, enabled } => {
            Ok(repository::add_media_repository(cx, &location, enabled))
        }
    }
}
