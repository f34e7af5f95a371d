//! levelspec core - reading and validating level description files
//!
//! Level files use a small JSON-like text format: quoted strings, decimal
//! numbers, `{}` groups of named fields and `[]` homogeneous lists, with
//! trailing commas allowed everywhere.
//!
//! # Architecture
//!
//! ```text
//! Level Text → Reader → Document (Group / Value tree)
//!                            ↓
//!             Schema → validate → ValidationResult (verdict + diagnostics)
//!                            ↓
//!                  caller reads fields out of the trusted tree
//! ```
//!
//! [`DocumentFile`] ties a root group to a path for loading and saving.
//! Built-in schemas for level files live in [`schemas`].
//!
//! # Guarantees
//!
//! - **Fail-stop parsing**: the first syntax error aborts the whole document
//! - **Accumulating validation**: every schema problem in a document is reported
//! - **Located diagnostics**: each problem carries `origin:line`
//! - **Deterministic output**: printing a document always yields identical text

pub mod diagnostic;
pub mod error;
pub mod file;
pub mod parser;
pub mod schema;
pub mod schemas;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use error::{Error, ParseError, Result};
pub use file::DocumentFile;
pub use parser::document::{Field, Group, List, Value, ValueKind, ValueType};
pub use parser::reader::{Reader, SourceInfo};
pub use parser::{parse, parse_value};
pub use schema::{SchemaField, SchemaGroup, SchemaKind, SchemaList, SchemaUnion, SchemaValue, ValidationResult};
pub use schemas::Schema;

/// Version of the levelspec-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
