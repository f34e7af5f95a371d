//! Error types for levelspec
//!
//! Syntax problems surface as [`ParseError`]; everything that touches the
//! filesystem or names a schema goes through [`Error`].

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::reader::SourceInfo;

/// A syntax error raised while reading a document.
///
/// The first one raised by a [`Reader`](crate::parser::reader::Reader) is
/// sticky: every later load on that reader returns it again.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{location}: {message}")]
pub struct ParseError {
    /// Where the reader was when the error was raised
    pub location: SourceInfo,
    /// Human-readable description
    pub message: String,
}

impl ParseError {
    pub fn new(location: SourceInfo, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

/// levelspec error types
#[derive(Debug, Error)]
pub enum Error {
    /// Syntax violation in a document
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// File could not be read or written
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No built-in schema with this name
    #[error("unknown schema '{0}'")]
    UnknownSchema(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for levelspec operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(SourceInfo::new("level.json", 7), "Expecting ':'");
        assert_eq!(err.to_string(), "level.json:7: Expecting ':'");
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let err: Error = ParseError::new(SourceInfo::new("a.json", 2), "boom").into();
        assert_eq!(err.to_string(), "a.json:2: boom");
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = Error::io(
            "missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.to_string().contains("missing.json"));
    }
}
