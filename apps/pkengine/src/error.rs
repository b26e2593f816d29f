//! CLI error handling

use std::fmt;

use pkengine_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(pkengine_errors::Error),
    /// Engine setup or admission error
    Ops(pkengine_errors::Error),
    /// The transaction task did not complete
    Task(String),
    /// I/O error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e.user_message()),
            CliError::Ops(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Task(msg) => write!(f, "Transaction task failed: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) | CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Task(_) => None,
        }
    }
}

impl From<pkengine_errors::Error> for CliError {
    fn from(e: pkengine_errors::Error) -> Self {
        match e {
            pkengine_errors::Error::Config(_) => CliError::Config(e),
            other => CliError::Ops(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<tokio::task::JoinError> for CliError {
    fn from(e: tokio::task::JoinError) -> Self {
        CliError::Task(e.to_string())
    }
}
