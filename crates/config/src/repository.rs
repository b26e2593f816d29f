//! Initial repository set
use pkengine_types::RepositoryDescriptor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Hidden by the `~devel` filter when set
    #[serde(default)]
    pub development: bool,
}

impl RepositoryConfig {
    fn new(id: &str, description: &str, development: bool) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            enabled: true,
            development,
        }
    }

    #[must_use]
    pub fn to_descriptor(&self) -> RepositoryDescriptor {
        RepositoryDescriptor::new(self.id.clone(), self.description.clone(), self.enabled)
            .development(self.development)
    }
}

/// Repositories known before any configuration file is read
#[must_use]
pub fn default_repositories() -> Vec<RepositoryConfig> {
    vec![
        RepositoryConfig::new("fedora", "Fedora - 9", false),
        RepositoryConfig::new("development", "Fedora - Development", true),
        RepositoryConfig::new(
            "livna-development",
            "Livna for Fedora Core 8 - i386 - Development Tree",
            false,
        ),
    ]
}

fn default_enabled() -> bool {
    true
}
