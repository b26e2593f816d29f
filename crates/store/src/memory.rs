//! In-memory store backed by a TOML catalogue

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use pkengine_errors::{Error, PackageError, StoreError};
use pkengine_types::{
    DistroUpgrade, Group, PackageDetails, PackageId, ProvidesKind, TrustRequirements,
    UpdateDetail,
};

use crate::catalog::{CatalogFile, CatalogPackage};
use crate::{Artifact, InstallPlan, PackageRecord, ResolvableStore, SearchKind, UpdateRecord};

const SAMPLE_CATALOG: &str = include_str!("../data/sample-catalog.toml");

/// Catalogue held in memory, with update bookkeeping
#[derive(Debug, Clone)]
pub struct MemoryStore {
    catalog: Arc<CatalogFile>,
    updated: Arc<RwLock<HashSet<PackageId>>>,
}

impl MemoryStore {
    /// Parse a catalogue document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CatalogParse`] if the document is not a valid
    /// catalogue.
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let catalog: CatalogFile =
            toml::from_str(text).map_err(|e| StoreError::CatalogParse {
                message: e.to_string(),
            })?;
        tracing::debug!(packages = catalog.packages.len(), "catalogue loaded");
        Ok(Self {
            catalog: Arc::new(catalog),
            updated: Arc::new(RwLock::new(HashSet::new())),
        })
    }

    /// Load a catalogue from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        Self::from_toml(&text)
    }

    /// The catalogue shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled catalogue fails to parse.
    pub fn sample() -> Result<Self, Error> {
        Self::from_toml(SAMPLE_CATALOG)
    }

    fn find(&self, id: &PackageId) -> Option<&CatalogPackage> {
        self.catalog.packages.iter().find(|p| &p.id == id)
    }

    /// Walk dependency edges breadth-first from `start`, skipping repeats
    fn walk(
        &self,
        start: &PackageId,
        recursive: bool,
        next: impl Fn(&PackageId) -> Vec<PackageId>,
    ) -> Vec<PackageRecord> {
        let mut seen: HashSet<PackageId> = HashSet::from([start.clone()]);
        let mut frontier = next(start);
        let mut out = Vec::new();

        while !frontier.is_empty() {
            let mut following = Vec::new();
            for id in frontier {
                if !seen.insert(id.clone()) {
                    continue;
                }
                if let Some(package) = self.find(&id) {
                    out.push(record(package));
                }
                if recursive {
                    following.extend(next(&id));
                }
            }
            frontier = following;
        }
        out
    }
}

fn collect<'a>(packages: impl Iterator<Item = &'a CatalogPackage>) -> Vec<PackageRecord> {
    packages.map(record).collect()
}

fn record(package: &CatalogPackage) -> PackageRecord {
    PackageRecord {
        id: package.id.clone(),
        summary: package.summary.clone(),
        facets: package.facets(),
    }
}

impl ResolvableStore for MemoryStore {
    fn packages(&self) -> Vec<PackageRecord> {
        collect(self.catalog.packages.iter())
    }

    fn lookup(&self, id: &PackageId) -> Option<PackageRecord> {
        self.find(id).map(record)
    }

    fn resolve(&self, name: &str) -> Vec<PackageRecord> {
        collect(self.catalog.packages.iter().filter(|p| p.id.name() == name))
    }

    fn search(&self, kind: SearchKind, text: &str) -> Vec<PackageRecord> {
        let needle = text.to_lowercase();
        let packages = self.catalog.packages.iter();
        match kind {
            SearchKind::Name => {
                collect(packages.filter(|p| p.id.name().to_lowercase().contains(&needle)))
            }
            SearchKind::Details => collect(packages.filter(|p| p.matches_details(&needle))),
            SearchKind::Group => match Group::from_name(&needle) {
                Some(group) => collect(packages.filter(|p| p.group == group)),
                None => {
                    tracing::debug!(group = text, "unknown group searched");
                    Vec::new()
                }
            },
            SearchKind::File => collect(
                packages.filter(|p| p.files.iter().any(|f| f.to_lowercase().contains(&needle))),
            ),
        }
    }

    fn details(&self, id: &PackageId) -> Option<PackageDetails> {
        self.find(id).map(CatalogPackage::details)
    }

    fn files(&self, id: &PackageId) -> Option<Vec<String>> {
        self.find(id).map(|p| p.files.clone())
    }

    fn depends(&self, id: &PackageId, recursive: bool) -> Vec<PackageRecord> {
        self.walk(id, recursive, |current| {
            self.find(current)
                .map(|p| p.depends.clone())
                .unwrap_or_default()
        })
    }

    fn requires(&self, id: &PackageId, recursive: bool) -> Vec<PackageRecord> {
        self.walk(id, recursive, |current| {
            self.catalog
                .packages
                .iter()
                .filter(|p| p.depends.contains(current))
                .map(|p| p.id.clone())
                .collect()
        })
    }

    fn available_updates(&self) -> Vec<UpdateRecord> {
        self.catalog
            .packages
            .iter()
            .filter_map(|p| {
                p.update.as_ref().map(|update| UpdateRecord {
                    package: record(p),
                    info: update.info,
                })
            })
            .collect()
    }

    fn update_detail(&self, id: &PackageId) -> Option<UpdateDetail> {
        self.find(id)
            .and_then(|p| p.update.as_ref().map(|u| u.detail(&p.id)))
    }

    fn mark_updated(&self, id: &PackageId) {
        self.updated
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone());
    }

    fn clear_updated(&self, id: &PackageId) {
        self.updated
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    fn is_updated(&self, id: &PackageId) -> bool {
        self.updated
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    fn reset_updates(&self) {
        self.updated
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn install_plan(&self, ids: &[PackageId]) -> Result<InstallPlan, Error> {
        let mut plan = InstallPlan::default();
        for id in ids {
            let package = self.find(id).ok_or_else(|| PackageError::NotFound {
                package_id: id.to_string(),
            })?;
            plan.targets.push(record(package));
            plan.derived
                .extend(package.pulls.iter().filter_map(|p| self.find(p)).map(record));
        }
        Ok(plan)
    }

    fn trust_requirements(&self, id: &PackageId) -> TrustRequirements {
        self.find(id)
            .map(|p| TrustRequirements {
                signature: p.signature.as_ref().map(|s| s.requirement(&p.id)),
                eula: p.eula.as_ref().map(|e| e.requirement(&p.id)),
            })
            .unwrap_or_default()
    }

    fn what_provides(&self, kind: ProvidesKind, text: &str) -> Vec<PackageRecord> {
        let providers = collect(
            self.catalog
                .packages
                .iter()
                .filter(|p| p.provides.iter().any(|c| c == text)),
        );
        if !providers.is_empty() {
            return providers;
        }
        tracing::debug!(?kind, capability = text, "no provider, using defaults");
        self.catalog
            .default_providers
            .iter()
            .filter_map(|id| self.lookup(id))
            .collect()
    }

    fn distro_upgrades(&self) -> Vec<DistroUpgrade> {
        self.catalog.distro_upgrades.clone()
    }

    fn artifact(&self, id: &PackageId) -> Option<Artifact> {
        self.find(id).and_then(|p| {
            p.artifact.as_ref().map(|a| Artifact {
                file_name: a.file_name.clone(),
                bytes: a.contents.clone().into_bytes(),
            })
        })
    }

    fn groups(&self) -> Vec<Group> {
        self.catalog.groups.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkengine_types::InfoKind;

    fn id(text: &str) -> PackageId {
        PackageId::parse(text).unwrap()
    }

    #[test]
    fn test_sample_parses() {
        let store = MemoryStore::sample().unwrap();
        assert!(!store.packages().is_empty());
        assert_eq!(
            store.groups(),
            vec![Group::Accessibility, Group::Games, Group::System]
        );
    }

    #[test]
    fn test_update_bookkeeping() {
        let store = MemoryStore::sample().unwrap();
        let powertop = id("powertop;1.8-1.fc8;i386;fedora");
        assert!(!store.is_updated(&powertop));
        store.mark_updated(&powertop);
        assert!(store.is_updated(&powertop));
        // clones share bookkeeping
        assert!(store.clone().is_updated(&powertop));
        store.reset_updates();
        assert!(!store.is_updated(&powertop));
    }

    #[test]
    fn test_available_updates_order() {
        let store = MemoryStore::sample().unwrap();
        let updates: Vec<_> = store
            .available_updates()
            .into_iter()
            .map(|u| (u.package.id.name().to_string(), u.info))
            .collect();
        assert_eq!(
            updates,
            vec![
                ("powertop".to_string(), InfoKind::Normal),
                ("kernel".to_string(), InfoKind::Security),
                ("gtkhtml2".to_string(), InfoKind::Security),
            ]
        );
    }

    #[test]
    fn test_install_plan_unknown_id() {
        let store = MemoryStore::sample().unwrap();
        let err = store
            .install_plan(&[id("nothere;1;noarch;fedora")])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Package(PackageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_bad_catalog() {
        let err = MemoryStore::from_toml("[[packages]]\nid = \"broken\"").unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::CatalogParse { .. })));
    }
}
