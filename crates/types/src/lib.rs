#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the pkengine transaction core
//!
//! This crate provides the data model shared by every other crate:
//! package identities, package results, filters, status and progress
//! values, trust requirements and repository descriptors.

pub mod details;
pub mod filter;
pub mod package;
pub mod repo;
pub mod status;
pub mod trust;

// Re-export commonly used types
pub use details::{
    DistroUpgrade, DistroUpgradeKind, Group, PackageDetails, ProvidesKind, UpdateDetail,
    UpdateState,
};
pub use filter::{Filter, FilterSet, PackageFacets};
pub use package::{
    InfoKind, PackageId, PackageResult, PACKAGE_ID_DELIMITER, PACKAGE_ID_LIST_DELIMITER,
};
pub use repo::RepositoryDescriptor;
pub use status::{Percentage, RestartKind, StatusKind};
pub use trust::{EulaRequirement, SigType, SignatureRequirement, TrustRequirements};

use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

// Implement clap::ValueEnum for OutputFormat
impl clap::ValueEnum for OutputFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Plain, Self::Json]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Plain => clap::builder::PossibleValue::new("plain"),
            Self::Json => clap::builder::PossibleValue::new("json"),
        })
    }
}

impl clap::ValueEnum for ProvidesKind {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self::Any,
            Self::Modalias,
            Self::Codec,
            Self::Mimetype,
            Self::Font,
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Any => clap::builder::PossibleValue::new("any"),
            Self::Modalias => clap::builder::PossibleValue::new("modalias"),
            Self::Codec => clap::builder::PossibleValue::new("codec"),
            Self::Mimetype => clap::builder::PossibleValue::new("mimetype"),
            Self::Font => clap::builder::PossibleValue::new("font"),
        })
    }
}
