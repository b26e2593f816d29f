//! On-disk catalogue format
//!
//! A catalogue is a TOML document listing packages together with the data
//! every query needs: summaries (optionally translated), details, files,
//! provides, dependencies, pending updates, trust requirements and a
//! downloadable artifact.

use std::collections::BTreeMap;

use pkengine_types::{
    DistroUpgrade, EulaRequirement, Group, InfoKind, PackageDetails, PackageFacets, PackageId,
    RestartKind, SigType, SignatureRequirement, UpdateDetail, UpdateState,
};
use serde::{Deserialize, Serialize};

/// Display text with per-locale overrides
///
/// `default` is shown for every locale without an explicit translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TextRepr")]
pub struct LocalizedText {
    pub default: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, String>,
}

impl LocalizedText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            default: text.into(),
            translations: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn render(&self, locale: &str) -> &str {
        self.translations
            .get(locale)
            .map_or(self.default.as_str(), String::as_str)
    }

    fn contains(&self, needle: &str) -> bool {
        std::iter::once(&self.default)
            .chain(self.translations.values())
            .any(|text| text.to_lowercase().contains(needle))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextRepr {
    Plain(String),
    Localized {
        default: String,
        #[serde(default)]
        translations: BTreeMap<String, String>,
    },
}

impl From<TextRepr> for LocalizedText {
    fn from(repr: TextRepr) -> Self {
        match repr {
            TextRepr::Plain(default) => Self::plain(default),
            TextRepr::Localized {
                default,
                translations,
            } => Self {
                default,
                translations,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CatalogFile {
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Returned by what-provides when no package provides the capability
    #[serde(default)]
    pub default_providers: Vec<PackageId>,
    #[serde(default)]
    pub distro_upgrades: Vec<DistroUpgrade>,
    #[serde(default)]
    pub packages: Vec<CatalogPackage>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CatalogPackage {
    pub id: PackageId,
    pub summary: LocalizedText,
    #[serde(default)]
    pub installed: bool,
    #[serde(default)]
    pub development: bool,
    #[serde(default)]
    pub gui: bool,
    #[serde(default = "default_group")]
    pub group: Group,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub provides: Vec<String>,
    #[serde(default)]
    pub depends: Vec<PackageId>,
    /// Installed alongside this package
    #[serde(default)]
    pub pulls: Vec<PackageId>,
    pub update: Option<UpdateEntry>,
    pub signature: Option<SignatureEntry>,
    pub eula: Option<EulaEntry>,
    pub artifact: Option<ArtifactEntry>,
}

fn default_group() -> Group {
    Group::Other
}

impl CatalogPackage {
    pub fn facets(&self) -> PackageFacets {
        PackageFacets {
            installed: self.installed,
            development: self.development,
            gui: self.gui,
        }
    }

    pub fn details(&self) -> PackageDetails {
        PackageDetails {
            id: self.id.clone(),
            license: self.license.clone(),
            group: self.group,
            description: self.description.clone(),
            url: self.url.clone(),
            size: self.size,
        }
    }

    pub fn matches_details(&self, needle: &str) -> bool {
        self.summary.contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UpdateEntry {
    #[serde(default = "default_update_info")]
    pub info: InfoKind,
    #[serde(default)]
    pub updates: Vec<PackageId>,
    #[serde(default)]
    pub obsoletes: Vec<PackageId>,
    pub vendor_url: Option<String>,
    pub bugzilla_url: Option<String>,
    pub cve_url: Option<String>,
    #[serde(default)]
    pub restart: RestartKind,
    #[serde(default)]
    pub update_text: String,
    pub changelog: Option<String>,
    #[serde(default)]
    pub state: UpdateState,
    pub issued: Option<String>,
}

fn default_update_info() -> InfoKind {
    InfoKind::Normal
}

impl UpdateEntry {
    pub fn detail(&self, id: &PackageId) -> UpdateDetail {
        UpdateDetail {
            id: id.clone(),
            updates: self.updates.clone(),
            obsoletes: self.obsoletes.clone(),
            vendor_url: self.vendor_url.clone(),
            bugzilla_url: self.bugzilla_url.clone(),
            cve_url: self.cve_url.clone(),
            restart: self.restart,
            update_text: self.update_text.clone(),
            changelog: self.changelog.clone(),
            state: self.state,
            issued: self.issued.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SignatureEntry {
    pub repository_name: String,
    pub key_url: String,
    pub key_userid: String,
    pub key_id: String,
    pub key_fingerprint: String,
    pub key_timestamp: String,
    #[serde(default = "default_sig_type")]
    pub sig_type: SigType,
}

fn default_sig_type() -> SigType {
    SigType::Gpg
}

impl SignatureEntry {
    pub fn requirement(&self, id: &PackageId) -> SignatureRequirement {
        SignatureRequirement {
            package_id: id.clone(),
            repository_name: self.repository_name.clone(),
            key_url: self.key_url.clone(),
            key_userid: self.key_userid.clone(),
            key_id: self.key_id.clone(),
            key_fingerprint: self.key_fingerprint.clone(),
            key_timestamp: self.key_timestamp.clone(),
            sig_type: self.sig_type,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EulaEntry {
    pub eula_id: String,
    pub vendor_name: String,
    pub license_agreement: String,
}

impl EulaEntry {
    pub fn requirement(&self, id: &PackageId) -> EulaRequirement {
        EulaRequirement {
            eula_id: self.eula_id.clone(),
            package_id: id.clone(),
            vendor_name: self.vendor_name.clone(),
            license_agreement: self.license_agreement.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ArtifactEntry {
    pub file_name: String,
    pub contents: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        text: LocalizedText,
    }

    #[test]
    fn test_plain_and_localized_text() {
        let plain: Wrapper = toml::from_str(r#"text = "The GLib library""#).unwrap();
        assert_eq!(plain.text.render("de_DE.utf8"), "The GLib library");

        let localized: Wrapper = toml::from_str(
            r#"
[text]
default = "PDF Dokument"
translations = { "en_GB.utf8" = "PDF Document viewer" }
"#,
        )
        .unwrap();
        assert_eq!(localized.text.render("en_GB.utf8"), "PDF Document viewer");
        assert_eq!(localized.text.render("fr_FR.utf8"), "PDF Dokument");
    }
}
