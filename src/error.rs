//! Error types shared by the command handlers, the CLI and the HTTP API.
//!
//! Internally the crate uses `anyhow` (see `Res`) so that every I/O call can attach context. At
//! module boundaries these errors are tagged with an `ErrorType` using `IntoResult::pub_result`,
//! which lets callers (e.g. the HTTP layer) decide how to present the failure.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The internal result type. Errors carry an `anyhow` context chain but no classification.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies an `Error` so that it can be mapped to an exit code or an HTTP status.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The requested category is not one of sales, received, purchases or expenses.
    InvalidCategory,
    /// A row index is out of range for the category.
    NotFound,
    /// The request payload could not be understood or coerced into the sheet's columns.
    Request,
    /// Reading, writing or renaming a file failed.
    Storage,
    /// The ledger home directory or its config file is missing or invalid.
    Config,
    /// Anything else.
    Internal,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type: an `ErrorType` together with the underlying context chain.
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

    /// Creates an error from a plain message.
    pub fn msg(error_type: ErrorType, message: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self::new(error_type, anyhow::Error::msg(message))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// The outermost context message, without the rest of the chain.
    pub fn summary(&self) -> String {
        self.inner.to_string()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Self::new(ErrorType::Internal, value)
    }
}

/// Converts any result whose error can become an `anyhow::Error` into a public `Result`, tagging
/// the error with `error_type`.
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
    fn test_pub_result_tags_error() {
        let res: Res<()> = Err(anyhow::anyhow!("disk full")).context("Unable to save workbook");
        let err = res.pub_result(ErrorType::Storage).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Storage);
        assert_eq!(err.summary(), "Unable to save workbook");
        assert_eq!(err.to_string(), "Unable to save workbook: disk full");
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::InvalidCategory.to_string(), "invalid_category");
        assert_eq!("not_found".parse::<ErrorType>().unwrap(), ErrorType::NotFound);
    }

    #[test]
    fn test_anyhow_defaults_to_internal() {
        let err: Error = anyhow::anyhow!("boom").into();
        assert_eq!(err.error_type(), ErrorType::Internal);
    }
}
