use pkengine_errors::ErrorCode;
use pkengine_types::{
    DistroUpgrade, EulaRequirement, PackageDetails, PackageId, PackageResult, Percentage,
    RepositoryDescriptor, RestartKind, SignatureRequirement, StatusKind, UpdateDetail,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{EventMeta, EventSource};

/// How a transaction ended, as carried by the `Finished` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitKind {
    Success,
    Failed,
    Cancelled,
}

impl fmt::Display for ExitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Everything a transaction can tell its caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionEvent {
    Status {
        status: StatusKind,
    },

    Percentage {
        percentage: Percentage,
    },

    SubPercentage {
        percentage: Percentage,
    },

    AllowCancel {
        allowed: bool,
    },

    Package(PackageResult),

    Details(PackageDetails),

    /// `package_id` is absent for aggregate file lists (downloads)
    Files {
        package_id: Option<PackageId>,
        files: Vec<String>,
    },

    UpdateDetail(UpdateDetail),

    DistroUpgrade(DistroUpgrade),

    RepoDetail(RepositoryDescriptor),

    RepoSignatureRequired(SignatureRequirement),

    EulaRequired(EulaRequirement),

    RequireRestart {
        restart: RestartKind,
        package_id: Option<PackageId>,
    },

    /// Free-text notice that does not end the transaction
    Message {
        message: String,
    },

    ErrorCode {
        code: ErrorCode,
        message: String,
    },

    Finished {
        exit: ExitKind,
    },
}

impl TransactionEvent {
    /// Identify the source domain for this event
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::Percentage { .. } | Self::SubPercentage { .. } | Self::AllowCancel { .. } => {
                EventSource::PROGRESS
            }
            Self::Package(_)
            | Self::Details(_)
            | Self::Files { .. }
            | Self::UpdateDetail(_)
            | Self::DistroUpgrade(_) => EventSource::PACKAGE,
            Self::RepoSignatureRequired(_) | Self::EulaRequired(_) => EventSource::TRUST,
            Self::RepoDetail(_) => EventSource::REPO,
            Self::Status { .. }
            | Self::RequireRestart { .. }
            | Self::Message { .. }
            | Self::ErrorCode { .. }
            | Self::Finished { .. } => EventSource::TRANSACTION,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::ErrorCode { .. } => Level::ERROR,
            Self::Message { .. } | Self::RepoSignatureRequired(_) | Self::EulaRequired(_) => {
                Level::WARN
            }
            Self::Percentage { .. } | Self::SubPercentage { .. } | Self::AllowCancel { .. } => {
                Level::DEBUG
            }
            _ => Level::INFO,
        }
    }

    /// Whether this is the terminal event
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Event plus the metadata that travels with it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: TransactionEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(event: TransactionEvent) -> Self {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        Self { meta, event }
    }

    #[must_use]
    pub fn with_meta(meta: EventMeta, event: TransactionEvent) -> Self {
        Self { meta, event }
    }
}
