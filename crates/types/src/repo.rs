//! Repository descriptors

use serde::{Deserialize, Serialize};

/// A repository as reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub id: String,
    pub description: String,
    pub enabled: bool,
    /// Development repositories are hidden by the `~devel` filter
    #[serde(default)]
    pub development: bool,
    /// Introduced from removable media rather than configuration
    #[serde(default)]
    pub adhoc: bool,
}

impl RepositoryDescriptor {
    pub fn new(id: impl Into<String>, description: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            enabled,
            development: false,
            adhoc: false,
        }
    }

    #[must_use]
    pub fn development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }
}
