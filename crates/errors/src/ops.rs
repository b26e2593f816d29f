//! Transaction scheduling error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpsError {
    #[error("{message}")]
    NoNetwork { message: String },

    #[error("the task was stopped successfully")]
    TransactionCancelled,

    #[error("another transaction is already running: {active}")]
    TransactionInProgress { active: String },

    #[error("operation failed: {message}")]
    OperationFailed { message: String },

    #[error("no packages specified")]
    NoPackagesSpecified,

    #[error("event channel closed")]
    EventChannelClosed,

    #[error("missing component: {component}")]
    MissingComponent { component: String },
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoNetwork { .. } => Some("Connect to a network and retry the operation."),
            Self::TransactionInProgress { .. } => {
                Some("Wait for the running transaction to finish before starting another.")
            }
            Self::NoPackagesSpecified => Some("Pass at least one package id."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NoNetwork { .. } | Self::TransactionInProgress { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::NoNetwork { .. } => "ops.no_network",
            Self::TransactionCancelled => "ops.cancelled",
            Self::TransactionInProgress { .. } => "ops.transaction_in_progress",
            Self::OperationFailed { .. } => "ops.operation_failed",
            Self::NoPackagesSpecified => "ops.no_packages_specified",
            Self::EventChannelClosed => "ops.event_channel_closed",
            Self::MissingComponent { .. } => "ops.missing_component",
        })
    }
}
