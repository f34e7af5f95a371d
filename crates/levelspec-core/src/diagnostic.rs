//! Diagnostics shared by the reader and the schema validator
//!
//! A diagnostic is always logged through `tracing` when it is recorded, and
//! also kept so callers (and tests) can inspect it without scraping logs.

use serde::Serialize;

use crate::parser::reader::SourceInfo;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Category of issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Malformed text; aborts the parse
    Syntax,
    /// Field name repeated inside one group; the later value wins
    DuplicateField,
    /// Underlying stream could not be read
    Io,
    /// Value tag differs from the schema tag
    TypeMismatch,
    /// Number outside the schema bounds
    OutOfRange,
    /// String not in the schema allow-list
    InvalidString,
    /// Required field absent
    MissingField,
    /// Undeclared fields under strict validation
    ExtraFields,
    /// List shorter or longer than allowed
    ListLength,
    /// Field not among the union options
    UnexpectedField,
    /// Wrong number of union options present
    UnionCount,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            DiagnosticKind::Syntax => "syntax",
            DiagnosticKind::DuplicateField => "duplicate-field",
            DiagnosticKind::Io => "io",
            DiagnosticKind::TypeMismatch => "type",
            DiagnosticKind::OutOfRange => "range",
            DiagnosticKind::InvalidString => "string",
            DiagnosticKind::MissingField => "missing-field",
            DiagnosticKind::ExtraFields => "extra-fields",
            DiagnosticKind::ListLength => "list-length",
            DiagnosticKind::UnexpectedField => "unexpected-field",
            DiagnosticKind::UnionCount => "union-count",
        };
        f.write_str(name)
    }
}

/// A single diagnostic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: SourceInfo,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, location: SourceInfo, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            location,
        }
    }

    pub fn warning(kind: DiagnosticKind, location: SourceInfo, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            location,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Write this diagnostic to the log sink
    pub(crate) fn emit(&self) {
        match self.severity {
            Severity::Error => tracing::error!(kind = %self.kind, "{}", self),
            Severity::Warning => tracing::warn!(kind = %self.kind, "{}", self),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}
