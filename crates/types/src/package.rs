//! Package identity and package result types

use pkengine_errors::PackageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field separator inside a package id
pub const PACKAGE_ID_DELIMITER: char = ';';

/// Separator used when several package ids share one text field
pub const PACKAGE_ID_LIST_DELIMITER: char = '^';

const FIELD_NAMES: [&str; 4] = ["name", "version", "arch", "data"];

/// Unique identifier for a package instance: `name;version;arch;data`
///
/// `data` names where the package comes from (a repository id, or
/// `installed` for the local database).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageId {
    name: String,
    version: String,
    arch: String,
    data: String,
}

impl PackageId {
    /// Create a package id from its parts
    ///
    /// # Errors
    ///
    /// Returns `PackageError::EmptyField` if any part is empty, or
    /// `PackageError::WrongFieldCount` if a part contains the delimiter.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        arch: impl Into<String>,
        data: impl Into<String>,
    ) -> Result<Self, PackageError> {
        let id = Self {
            name: name.into(),
            version: version.into(),
            arch: arch.into(),
            data: data.into(),
        };
        // Round-trip through the parser so both constructors share one set of rules
        Self::parse(&id.to_string())
    }

    /// Parse a package id from its delimited text form
    ///
    /// # Errors
    ///
    /// Returns `PackageError` if the text does not split into exactly four
    /// non-empty fields.
    pub fn parse(text: &str) -> Result<Self, PackageError> {
        let fields: Vec<&str> = text.split(PACKAGE_ID_DELIMITER).collect();
        if fields.len() != FIELD_NAMES.len() {
            return Err(PackageError::WrongFieldCount {
                input: text.to_string(),
                found: fields.len(),
            });
        }
        if let Some(pos) = fields.iter().position(|f| f.is_empty()) {
            return Err(PackageError::EmptyField {
                input: text.to_string(),
                field: FIELD_NAMES[pos].to_string(),
            });
        }

        Ok(Self {
            name: fields[0].to_string(),
            version: fields[1].to_string(),
            arch: fields[2].to_string(),
            data: fields[3].to_string(),
        })
    }

    /// Parse a `^`-separated list of package ids
    ///
    /// # Errors
    ///
    /// Returns the first `PackageError` encountered.
    pub fn parse_list(text: &str) -> Result<Vec<Self>, PackageError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        text.split(PACKAGE_ID_LIST_DELIMITER)
            .map(Self::parse)
            .collect()
    }

    /// Join package ids into the `^`-separated list form
    #[must_use]
    pub fn join_list(ids: &[Self]) -> String {
        ids.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(&PACKAGE_ID_LIST_DELIMITER.to_string())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}{d}{}",
            self.name,
            self.version,
            self.arch,
            self.data,
            d = PACKAGE_ID_DELIMITER
        )
    }
}

impl FromStr for PackageId {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PackageId {
    type Error = PackageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PackageId> for String {
    fn from(id: PackageId) -> Self {
        id.to_string()
    }
}

/// What a package event says about the package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoKind {
    Installed,
    Available,
    Installing,
    Updating,
    Downloading,
    Removing,
    Cleanup,
    Blocked,
    Security,
    Normal,
}

impl fmt::Display for InfoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Installed => "installed",
            Self::Available => "available",
            Self::Installing => "installing",
            Self::Updating => "updating",
            Self::Downloading => "downloading",
            Self::Removing => "removing",
            Self::Cleanup => "cleanup",
            Self::Blocked => "blocked",
            Self::Security => "security",
            Self::Normal => "normal",
        };
        f.write_str(s)
    }
}

/// One package line in a transaction's result stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageResult {
    pub id: PackageId,
    pub info: InfoKind,
    pub summary: String,
}

impl PackageResult {
    pub fn new(id: PackageId, info: InfoKind, summary: impl Into<String>) -> Self {
        Self {
            id,
            info,
            summary: summary.into(),
        }
    }

    /// Key used to suppress duplicate emissions within a transaction
    #[must_use]
    pub fn dedup_key(&self) -> (PackageId, InfoKind) {
        (self.id.clone(), self.info)
    }
}
