//! Detail payloads: package details, update details, distro upgrades

use crate::{PackageId, RestartKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Package group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Group {
    Accessibility,
    Games,
    Programming,
    System,
    Other,
}

impl Group {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "accessibility" => Some(Self::Accessibility),
            "games" => Some(Self::Games),
            "programming" => Some(Self::Programming),
            "system" => Some(Self::System),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Accessibility => "accessibility",
            Self::Games => "games",
            Self::Programming => "programming",
            Self::System => "system",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Long-form description of a single package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDetails {
    pub id: PackageId,
    pub license: String,
    pub group: Group,
    pub description: String,
    pub url: String,
    pub size: u64,
}

/// Stability of an update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateState {
    Stable,
    Unstable,
    Testing,
    #[default]
    Unknown,
}

/// Why and how a package should be updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDetail {
    pub id: PackageId,
    /// Installed packages this update replaces
    pub updates: Vec<PackageId>,
    pub obsoletes: Vec<PackageId>,
    pub vendor_url: Option<String>,
    pub bugzilla_url: Option<String>,
    pub cve_url: Option<String>,
    pub restart: RestartKind,
    pub update_text: String,
    pub changelog: Option<String>,
    pub state: UpdateState,
    pub issued: Option<String>,
}

/// Release channel of a distribution upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistroUpgradeKind {
    Stable,
    Unstable,
}

/// An available distribution upgrade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistroUpgrade {
    pub kind: DistroUpgradeKind,
    pub name: String,
    pub summary: String,
}

/// Capability namespace for what-provides queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvidesKind {
    #[default]
    Any,
    Modalias,
    Codec,
    Mimetype,
    Font,
}
