#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Collaborators consumed by the transaction engine
//!
//! The engine never talks to a package library directly. It queries a
//! [`ResolvableStore`], asks a [`NetworkProbe`] whether it is online, reads
//! the caller locale from a [`LocaleProvider`] and hands downloads to an
//! [`ArtifactWriter`]. This crate defines those seams plus in-memory and
//! filesystem implementations.

mod catalog;
mod memory;
mod probe;
mod writer;

pub use catalog::LocalizedText;
pub use memory::MemoryStore;
pub use probe::{FixedLocale, StaticNetwork};
pub use writer::FsArtifactWriter;

use std::fmt;
use std::path::{Path, PathBuf};

use pkengine_errors::Error;
use pkengine_types::{
    DistroUpgrade, Group, InfoKind, PackageDetails, PackageFacets, PackageId, PackageResult,
    ProvidesKind, TrustRequirements, UpdateDetail,
};

/// A package as known to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub id: PackageId,
    pub summary: LocalizedText,
    pub facets: PackageFacets,
}

impl PackageRecord {
    /// `Installed` or `Available`, depending on the installed facet
    #[must_use]
    pub fn state(&self) -> InfoKind {
        if self.facets.installed {
            InfoKind::Installed
        } else {
            InfoKind::Available
        }
    }

    /// Package line for this record with the summary rendered for `locale`
    #[must_use]
    pub fn result(&self, info: InfoKind, locale: &str) -> PackageResult {
        PackageResult::new(self.id.clone(), info, self.summary.render(locale))
    }
}

/// A pending update and how it is classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecord {
    pub package: PackageRecord,
    pub info: InfoKind,
}

/// Packages touched by an install
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    /// Requested packages, in request order
    pub targets: Vec<PackageRecord>,
    /// Packages installed alongside the targets; may repeat entries
    pub derived: Vec<PackageRecord>,
}

/// A downloadable package file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Field matched by a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    Name,
    Details,
    Group,
    File,
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Details => "details",
            Self::Group => "group",
            Self::File => "file",
        };
        f.write_str(s)
    }
}

/// Package metadata source queried by transactions
///
/// Every call must complete within one scheduler tick.
pub trait ResolvableStore: Send + Sync + fmt::Debug {
    /// Every package, in catalogue order
    fn packages(&self) -> Vec<PackageRecord>;

    fn lookup(&self, id: &PackageId) -> Option<PackageRecord>;

    /// Packages whose name equals `name`
    fn resolve(&self, name: &str) -> Vec<PackageRecord>;

    fn search(&self, kind: SearchKind, text: &str) -> Vec<PackageRecord>;

    fn details(&self, id: &PackageId) -> Option<PackageDetails>;

    fn files(&self, id: &PackageId) -> Option<Vec<String>>;

    /// Packages `id` depends on
    fn depends(&self, id: &PackageId, recursive: bool) -> Vec<PackageRecord>;

    /// Packages that depend on `id`
    fn requires(&self, id: &PackageId, recursive: bool) -> Vec<PackageRecord>;

    /// Every pending update, updated or not
    fn available_updates(&self) -> Vec<UpdateRecord>;

    fn update_detail(&self, id: &PackageId) -> Option<UpdateDetail>;

    fn mark_updated(&self, id: &PackageId);

    /// Clear the updated flag of one package
    fn clear_updated(&self, id: &PackageId);

    fn is_updated(&self, id: &PackageId) -> bool;

    fn reset_updates(&self);

    /// Resolve requested ids into an install plan.
    ///
    /// # Errors
    ///
    /// Returns an error if any requested id is unknown.
    fn install_plan(&self, ids: &[PackageId]) -> Result<InstallPlan, Error>;

    fn trust_requirements(&self, id: &PackageId) -> TrustRequirements;

    /// Packages providing a capability, or the default provider list when
    /// none does
    fn what_provides(&self, kind: ProvidesKind, text: &str) -> Vec<PackageRecord>;

    fn distro_upgrades(&self) -> Vec<DistroUpgrade>;

    fn artifact(&self, id: &PackageId) -> Option<Artifact>;

    fn groups(&self) -> Vec<Group>;
}

/// Network reachability
pub trait NetworkProbe: Send + Sync + fmt::Debug {
    fn is_online(&self) -> bool;
}

/// Locale used to render display text
pub trait LocaleProvider: Send + Sync + fmt::Debug {
    fn locale(&self) -> String;
}

/// Writes downloaded artifacts to a destination directory
#[async_trait::async_trait]
pub trait ArtifactWriter: Send + Sync + fmt::Debug {
    /// Write `artifact` into `directory`, returning the written path.
    async fn write(&self, directory: &Path, artifact: &Artifact) -> Result<PathBuf, Error>;
}
