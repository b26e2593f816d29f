//! Requests a transaction can carry

use std::fmt;
use std::path::PathBuf;

use pkengine_types::{FilterSet, ProvidesKind, SigType};
use serde::{Deserialize, Serialize};

/// One transaction request
///
/// Package ids arrive as caller text and are parsed when the transaction
/// validates, so a malformed id surfaces on the event stream rather than
/// at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum Operation {
    Resolve {
        filters: FilterSet,
        names: Vec<String>,
    },
    SearchName {
        filters: FilterSet,
        text: String,
    },
    SearchDetails {
        filters: FilterSet,
        text: String,
    },
    SearchGroup {
        filters: FilterSet,
        text: String,
    },
    SearchFile {
        filters: FilterSet,
        text: String,
    },
    GetDepends {
        filters: FilterSet,
        package_ids: Vec<String>,
        recursive: bool,
    },
    GetRequires {
        filters: FilterSet,
        package_ids: Vec<String>,
        recursive: bool,
    },
    GetDetails {
        package_ids: Vec<String>,
    },
    GetFiles {
        package_ids: Vec<String>,
    },
    GetUpdates {
        filters: FilterSet,
    },
    GetUpdateDetail {
        package_ids: Vec<String>,
    },
    GetPackages {
        filters: FilterSet,
    },
    GetDistroUpgrades,
    WhatProvides {
        filters: FilterSet,
        kind: ProvidesKind,
        text: String,
    },
    InstallPackages {
        package_ids: Vec<String>,
    },
    InstallSignature {
        sig_type: SigType,
        key_id: String,
        package_id: String,
    },
    AcceptEula {
        eula_id: String,
    },
    InstallFiles {
        trusted: bool,
        paths: Vec<PathBuf>,
    },
    RemovePackages {
        package_ids: Vec<String>,
        allow_deps: bool,
        autoremove: bool,
    },
    UpdatePackages {
        package_ids: Vec<String>,
    },
    UpdateSystem,
    RefreshCache {
        force: bool,
    },
    DownloadPackages {
        package_ids: Vec<String>,
        directory: PathBuf,
    },
    Rollback {
        transaction_id: String,
    },
    GetRepoList {
        filters: FilterSet,
    },
    RepoEnable {
        repo_id: String,
        enabled: bool,
    },
    RepoSetData {
        repo_id: String,
        parameter: String,
        value: String,
    },
    AddMediaRepository {
        location: String,
        enabled: bool,
    },
}

impl Operation {
    /// Stable role name, used in logs and spans
    #[must_use]
    pub fn role(&self) -> &'static str {
        match self {
            Self::Resolve { .. } => "resolve",
            Self::SearchName { .. } => "search-name",
            Self::SearchDetails { .. } => "search-details",
            Self::SearchGroup { .. } => "search-group",
            Self::SearchFile { .. } => "search-file",
            Self::GetDepends { .. } => "get-depends",
            Self::GetRequires { .. } => "get-requires",
            Self::GetDetails { .. } => "get-details",
            Self::GetFiles { .. } => "get-files",
            Self::GetUpdates { .. } => "get-updates",
            Self::GetUpdateDetail { .. } => "get-update-detail",
            Self::GetPackages { .. } => "get-packages",
            Self::GetDistroUpgrades => "get-distro-upgrades",
            Self::WhatProvides { .. } => "what-provides",
            Self::InstallPackages { .. } => "install-packages",
            Self::InstallSignature { .. } => "install-signature",
            Self::AcceptEula { .. } => "accept-eula",
            Self::InstallFiles { .. } => "install-files",
            Self::RemovePackages { .. } => "remove-packages",
            Self::UpdatePackages { .. } => "update-packages",
            Self::UpdateSystem => "update-system",
            Self::RefreshCache { .. } => "refresh-cache",
            Self::DownloadPackages { .. } => "download-packages",
            Self::Rollback { .. } => "rollback",
            Self::GetRepoList { .. } => "get-repo-list",
            Self::RepoEnable { .. } => "repo-enable",
            Self::RepoSetData { .. } => "repo-set-data",
            Self::AddMediaRepository { .. } => "add-media-repository",
        }
    }

    /// Whether the operation changes installed state
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::InstallPackages { .. }
                | Self::InstallFiles { .. }
                | Self::RemovePackages { .. }
                | Self::UpdatePackages { .. }
                | Self::UpdateSystem
                | Self::Rollback { .. }
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_are_kebab_case() {
        let op = Operation::UpdatePackages {
            package_ids: vec!["powertop;1.8-1.fc8;i386;fedora".to_string()],
        };
        assert_eq!(op.role(), "update-packages");
        assert!(op.is_mutating());
        assert!(!Operation::GetDistroUpgrades.is_mutating());
        assert_eq!(Operation::UpdateSystem.to_string(), "update-system");
    }
}
