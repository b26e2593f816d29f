//! Transaction status, progress and restart hints

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the transaction is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusKind {
    Setup,
    Query,
    Request,
    Running,
    Download,
    Install,
    Update,
    Remove,
    RefreshCache,
    Cancel,
    Finished,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Setup => "setup",
            Self::Query => "query",
            Self::Request => "request",
            Self::Running => "running",
            Self::Download => "download",
            Self::Install => "install",
            Self::Update => "update",
            Self::Remove => "remove",
            Self::RefreshCache => "refresh-cache",
            Self::Cancel => "cancel",
            Self::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// A 0..=100 percentage, or unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(Option<u8>);

impl Percentage {
    pub const UNKNOWN: Self = Self(None);
    pub const ZERO: Self = Self(Some(0));
    pub const COMPLETE: Self = Self(Some(100));

    /// Create a known percentage, saturating at 100
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(Some(value.min(100)))
    }

    #[must_use]
    pub fn value(self) -> Option<u8> {
        self.0
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        self.0.is_some()
    }
}

impl From<u8> for Percentage {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v}%"),
            None => f.write_str("unknown"),
        }
    }
}

/// What must be restarted after a transaction for its changes to apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestartKind {
    #[default]
    None,
    Session,
    System,
}

impl fmt::Display for RestartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Session => "session",
            Self::System => "system",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_saturates() {
        assert_eq!(Percentage::new(140), Percentage::COMPLETE);
        assert_eq!(Percentage::new(30).value(), Some(30));
        assert!(!Percentage::UNKNOWN.is_known());
    }

    #[test]
    fn test_restart_ordering() {
        assert!(RestartKind::System > RestartKind::Session);
        assert!(RestartKind::Session > RestartKind::None);
    }
}
