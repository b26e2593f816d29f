#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Repository registry
//!
//! Tracks the known repositories, their enabled flag and opaque per-repo
//! parameters. The registry is shared by every transaction of an engine.
//! Repositories introduced from removable media are always registered
//! disabled; only an explicit enable may turn them on.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pkengine_errors::RepoError;
use pkengine_types::{Filter, FilterSet, RepositoryDescriptor};

/// Id under which a removable-media repository is registered
pub const MEDIA_REPO_ID: &str = "local";

const MEDIA_REPO_DESCRIPTION: &str = "Local PackageKit volume";

#[derive(Debug, Clone)]
struct RepoEntry {
    descriptor: RepositoryDescriptor,
    parameters: BTreeMap<String, String>,
}

impl RepoEntry {
    fn new(descriptor: RepositoryDescriptor) -> Self {
        Self {
            descriptor,
            parameters: BTreeMap::new(),
        }
    }
}

/// Ordered, shared set of repositories
#[derive(Debug, Clone, Default)]
pub struct RepoRegistry {
    entries: Arc<RwLock<Vec<RepoEntry>>>,
}

impl RepoRegistry {
    /// Build a registry from the configured descriptors, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::DuplicateRepository`] if two descriptors share an id,
    /// or [`RepoError::ReservedRepository`] for a descriptor using [`MEDIA_REPO_ID`].
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = RepositoryDescriptor>,
    ) -> Result<Self, RepoError> {
        let mut entries: Vec<RepoEntry> = Vec::new();
        for descriptor in descriptors {
            if descriptor.id == MEDIA_REPO_ID {
                return Err(RepoError::ReservedRepository { id: descriptor.id });
            }
            if entries.iter().any(|e| e.descriptor.id == descriptor.id) {
                return Err(RepoError::DuplicateRepository { id: descriptor.id });
            }
            entries.push(RepoEntry::new(descriptor));
        }
        Ok(Self {
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<RepoEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<RepoEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Descriptors accepted by `keep`, in registry order
    pub fn list(&self, keep: impl Fn(&RepositoryDescriptor) -> bool) -> Vec<RepositoryDescriptor> {
        self.read()
            .iter()
            .map(|e| &e.descriptor)
            .filter(|d| keep(d))
            .cloned()
            .collect()
    }

    /// Descriptors visible under a filter set.
    ///
    /// Only the development facets apply to repositories; other facets are
    /// ignored.
    #[must_use]
    pub fn list_filtered(&self, filters: &FilterSet) -> Vec<RepositoryDescriptor> {
        let hide_devel = filters.contains(Filter::NotDevelopment);
        let only_devel = filters.contains(Filter::Development);
        self.list(|d| !(hide_devel && d.development) && !(only_devel && !d.development))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<RepositoryDescriptor> {
        self.read()
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| e.descriptor.clone())
    }

    /// Flip a repository's enabled flag.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::UnknownRepository`] if no repository has this id.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<RepositoryDescriptor, RepoError> {
        let mut entries = self.write();
        let entry = entries
            .iter_mut()
            .find(|e| e.descriptor.id == id)
            .ok_or_else(|| RepoError::UnknownRepository { id: id.to_string() })?;
        entry.descriptor.enabled = enabled;
        tracing::debug!(repo = id, enabled, "repository enabled flag changed");
        Ok(entry.descriptor.clone())
    }

    /// Store an opaque parameter. Values are not validated here; unknown
    /// repositories are logged and otherwise ignored.
    pub fn set_parameter(&self, id: &str, key: &str, value: &str) {
        let mut entries = self.write();
        match entries.iter_mut().find(|e| e.descriptor.id == id) {
            Some(entry) => {
                entry.parameters.insert(key.to_string(), value.to_string());
                tracing::debug!(repo = id, key, value, "repository parameter set");
            }
            None => tracing::warn!(repo = id, key, value, "parameter for unknown repository"),
        }
    }

    #[must_use]
    pub fn parameter(&self, id: &str, key: &str) -> Option<String> {
        self.read()
            .iter()
            .find(|e| e.descriptor.id == id)
            .and_then(|e| e.parameters.get(key).cloned())
    }

    /// Register or withdraw the removable-media repository at `location`.
    ///
    /// When `enabled` is set the repository is (re)registered with its
    /// enabled flag forced off and the resulting descriptor is returned so
    /// the caller can announce it. When `enabled` is false the repository
    /// is removed and `None` is returned.
    pub fn add_media_repository(
        &self,
        location: &str,
        enabled: bool,
    ) -> Option<RepositoryDescriptor> {
        let mut entries = self.write();
        entries.retain(|e| !e.descriptor.adhoc);

        if !enabled {
            tracing::info!(location, "removable media repository withdrawn");
            return None;
        }

        let mut descriptor =
            RepositoryDescriptor::new(MEDIA_REPO_ID, MEDIA_REPO_DESCRIPTION, false);
        descriptor.adhoc = true;

        let mut entry = RepoEntry::new(descriptor.clone());
        entry
            .parameters
            .insert("location".to_string(), location.to_string());
        // media repos are listed ahead of configured ones
        entries.insert(0, entry);

        tracing::warn!(location, "removable media repository added disabled");
        Some(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RepoRegistry {
        RepoRegistry::from_descriptors(vec![
            RepositoryDescriptor::new("fedora", "Fedora - 9", true),
            RepositoryDescriptor::new("development", "Fedora - Development", true)
                .development(true),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = RepoRegistry::from_descriptors(vec![
            RepositoryDescriptor::new("fedora", "a", true),
            RepositoryDescriptor::new("fedora", "b", true),
        ]);
        assert_eq!(
            result.unwrap_err(),
            RepoError::DuplicateRepository {
                id: "fedora".to_string()
            }
        );
    }

    #[test]
    fn test_media_id_reserved() {
        let result = RepoRegistry::from_descriptors(vec![
            RepositoryDescriptor::new("fedora", "a", true),
            RepositoryDescriptor::new(MEDIA_REPO_ID, "configured", true),
        ]);
        assert!(matches!(
            result,
            Err(RepoError::ReservedRepository { ref id }) if id == MEDIA_REPO_ID
        ));
    }

    #[test]
    fn test_withdrawing_media_keeps_configured_repos() {
        let repos = registry();
        repos.add_media_repository("/media/dvd", true);
        repos.add_media_repository("/media/dvd", false);
        let ids: Vec<String> = repos.list(|_| true).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["fedora", "development"]);
    }

    #[test]
    fn test_filter_hides_development() {
        let repos = registry();
        let visible = repos.list_filtered(&FilterSet::parse("~devel"));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "fedora");
        // listing does not mutate
        assert_eq!(repos.list_filtered(&FilterSet::none()).len(), 2);
        let devel = repos.list_filtered(&FilterSet::parse("devel"));
        assert_eq!(devel[0].id, "development");
    }

    #[test]
    fn test_unknown_repo_enable() {
        let repos = registry();
        assert!(matches!(
            repos.set_enabled("nope", true),
            Err(RepoError::UnknownRepository { .. })
        ));
        let fedora = repos.set_enabled("fedora", false).unwrap();
        assert!(!fedora.enabled);
    }

    #[test]
    fn test_parameters_are_opaque() {
        let repos = registry();
        repos.set_parameter("fedora", "mirror", "anything goes");
        repos.set_parameter("missing", "mirror", "ignored");
        assert_eq!(
            repos.parameter("fedora", "mirror").as_deref(),
            Some("anything goes")
        );
        assert!(repos.parameter("missing", "mirror").is_none());
    }
}
