//! The public error type for MicroSave.
//!
//! Internally the crate uses `anyhow` so that failures can accumulate context as they bubble up.
//! At the public boundary, an `anyhow::Error` is wrapped in `Error` along with an `ErrorType` so
//! that callers (the CLI, the interactive shell, tests) can decide how to present it.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies an `Error` so that callers can react to the kind of failure rather than its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Bad user input: a negative amount, a malformed date or a non-numeric value.
    Validation,
    /// The store could not be opened or written to.
    Connection,
    /// The store was reachable but its contents could not be read or decoded.
    DataUnavailable,
    /// The report file could not be opened or appended to.
    ExportFailed,
    /// The home directory or its configuration file is missing or invalid.
    Config,
    /// Reading from or writing to the terminal failed.
    Io,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error with an `ErrorType` and a chain of context messages.
#[derive(Debug, thiserror::Error)]
#[error("{inner:#}")]
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// Creates a `Validation` error from a message.
    pub fn validation(message: impl Display) -> Self {
        Self::new(ErrorType::Validation, anyhow::anyhow!("{message}"))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// A short, human-readable heading for the kind of failure.
    pub fn heading(&self) -> &'static str {
        match self.error_type {
            ErrorType::Validation => "Invalid input",
            ErrorType::Connection => "Unable to reach the ledger store",
            ErrorType::DataUnavailable => "Unable to read the ledger store",
            ErrorType::ExportFailed => "Export failed",
            ErrorType::Config => "Configuration error",
            ErrorType::Io => "Terminal error",
        }
    }
}

/// Converts an internal result into the public `Result`, tagging the error with an `ErrorType`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_keeps_context_chain() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("disk on fire"));
        let err = result
            .context("Unable to open the store")
            .pub_result(ErrorType::Connection)
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Connection);
        let message = err.to_string();
        assert!(message.contains("Unable to open the store"), "{message}");
        assert!(message.contains("disk on fire"), "{message}");
    }

    #[test]
    fn test_validation_error() {
        let err = Error::validation("Amount cannot be negative.");
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert_eq!(err.to_string(), "Amount cannot be negative.");
        assert_eq!(err.heading(), "Invalid input");
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::DataUnavailable.to_string(), "data_unavailable");
        assert_eq!(ErrorType::ExportFailed.to_string(), "export_failed");
    }
}
