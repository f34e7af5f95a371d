//! Reader - character cursor over an in-memory level document
//!
//! Produces the primitive tokens the document parser needs: quoted strings,
//! numbers and boolean words. Tracks the current line for diagnostics.
//!
//! Guarantees:
//! - The whole input is in memory before the first token is produced
//! - The first syntax error is sticky: every later load returns it again
//! - Whitespace is space, `\n` and `\r` only

use std::io::{self, Read};
use std::path::Path;

use serde::Serialize;

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::error::ParseError;

/// Where a node or diagnostic came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SourceInfo {
    /// File name, or whatever name the caller gave the input
    pub origin: String,
    /// 1-based line number
    pub line: usize,
}

impl SourceInfo {
    pub fn new(origin: impl Into<String>, line: usize) -> Self {
        Self {
            origin: origin.into(),
            line,
        }
    }
}

impl std::fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.origin, self.line)
    }
}

/// Cursor over level document text
pub struct Reader {
    input: Vec<char>,
    position: usize,
    line: usize,
    origin: String,
    failure: Option<ParseError>,
    io_error: Option<io::Error>,
    diagnostics: Vec<Diagnostic>,
}

impl Reader {
    /// Create a reader over in-memory text
    pub fn new(origin: impl Into<String>, text: &str) -> Self {
        let mut reader = Reader {
            input: text.chars().collect(),
            position: 0,
            line: 1,
            origin: origin.into(),
            failure: None,
            io_error: None,
            diagnostics: Vec::new(),
        };
        reader.skip_whitespace();
        reader
    }

    /// Read a whole stream into memory and create a reader over it.
    ///
    /// A read failure yields a reader that is already invalid with an `Io`
    /// diagnostic. Input that is not UTF-8 is a syntax error on the line
    /// where the bad bytes start.
    pub fn from_reader(origin: impl Into<String>, mut source: impl Read) -> Self {
        let origin = origin.into();
        let mut bytes = Vec::new();
        if let Err(err) = source.read_to_end(&mut bytes) {
            return Reader::unreadable(origin, format!("Unable to read input: {}", err), err);
        }

        match String::from_utf8(bytes) {
            Ok(text) => Reader::new(origin, &text),
            Err(err) => {
                let valid = err.utf8_error().valid_up_to();
                let bytes = err.into_bytes();
                let mut reader = Reader::new(origin, "");
                reader.line = 1 + bytes[..valid].iter().filter(|&&b| b == b'\n').count();
                reader.fail(
                    DiagnosticKind::Syntax,
                    format!("Invalid UTF-8 at byte {}", valid),
                );
                reader
            }
        }
    }

    /// Create a reader over the contents of a file; the path is the origin
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let origin = path.display().to_string();
        match std::fs::File::open(path) {
            Ok(file) => Reader::from_reader(origin, file),
            Err(err) => Reader::unreadable(origin, format!("Unable to open file: {}", err), err),
        }
    }

    fn unreadable(origin: String, message: String, err: io::Error) -> Self {
        let mut reader = Reader::new(origin, "");
        reader.fail(DiagnosticKind::Io, message);
        reader.io_error = Some(err);
        reader
    }

    /// Take the I/O error that stopped this reader from getting its input.
    ///
    /// `None` once taken, and for readers that failed on syntax instead.
    pub fn take_io_error(&mut self) -> Option<io::Error> {
        self.io_error.take()
    }

    /// True until the first error is raised
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }

    /// The first error raised, if any
    pub fn failure(&self) -> Option<&ParseError> {
        self.failure.as_ref()
    }

    pub fn current_line(&self) -> usize {
        self.line
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Current position as a source location
    pub fn location(&self) -> SourceInfo {
        SourceInfo::new(self.origin.clone(), self.line)
    }

    /// Everything this reader has reported so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    // ── Cursor ─────────────────────────────────────────────

    /// Skip whitespace and return the next symbol without consuming it
    pub fn peek_next_symbol(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.peek()
    }

    /// Consume the current symbol and any whitespace after it
    pub fn skip_symbol(&mut self) {
        if self.is_valid() {
            self.advance();
            self.skip_whitespace();
        }
    }

    /// True for characters that can start a number
    pub fn is_numeric_start(c: char) -> bool {
        c.is_ascii_digit() || c == '-'
    }

    // ── Tokens ─────────────────────────────────────────────

    /// Load a quote-enclosed string. No escape sequences are processed.
    pub fn load_string(&mut self) -> Result<String, ParseError> {
        self.ensure_valid()?;

        match self.peek_next_symbol() {
            Some('"') => {
                self.advance();
            }
            other => {
                return Err(self.error(format!(
                    "Unexpected symbol {} expecting '\"'",
                    describe(other)
                )));
            }
        }

        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error("Unexpected end of file while reading string")),
                Some('"') => break,
                Some(c) => value.push(c),
            }
        }

        self.skip_whitespace();
        Ok(value)
    }

    /// Load a number: optional leading `-`, digits, at most one `.`
    pub fn load_numeric(&mut self) -> Result<f64, ParseError> {
        self.ensure_valid()?;

        let mut text = String::new();
        match self.peek_next_symbol() {
            Some(c) if Self::is_numeric_start(c) => {
                self.advance();
                text.push(c);
            }
            other => {
                return Err(self.error(format!("Invalid numeric symbol {}", describe(other))));
            }
        }

        let mut decimal = false;
        while let Some(c) = self.peek() {
            if c == '.' {
                if decimal {
                    return Err(self.error("Too many decimal points in number"));
                }
                decimal = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            self.advance();
            text.push(c);
        }

        if !text.chars().any(|c| c.is_ascii_digit()) {
            if self.is_at_end() {
                return Err(self.error("Unexpected end of file while reading number"));
            }
            return Err(self.error(format!("Expected digits in number '{}'", text)));
        }

        let value = match text.parse::<f64>() {
            Ok(value) => value,
            Err(_) => return Err(self.error(format!("Invalid number '{}'", text))),
        };
        if !value.is_finite() {
            return Err(self.error(format!("Number '{}' is out of range", text)));
        }
        self.skip_whitespace();
        Ok(value)
    }

    /// Load a bare `true` or `false`.
    ///
    /// Characters are accumulated until they spell one of the two words;
    /// anything longer than five characters is rejected.
    pub fn load_bool(&mut self) -> Result<bool, ParseError> {
        self.ensure_valid()?;

        match self.peek_next_symbol() {
            Some('t') | Some('f') => {}
            None => return Err(self.error("Unexpected end of file while reading boolean")),
            Some(c) => {
                return Err(self.error(format!("Unexpected character '{}' expecting boolean", c)));
            }
        }

        let mut word = String::new();
        while let Some(c) = self.peek() {
            if is_whitespace(c) {
                break;
            }
            self.advance();
            word.push(c);

            match word.as_str() {
                "true" => {
                    self.skip_whitespace();
                    return Ok(true);
                }
                "false" => {
                    self.skip_whitespace();
                    return Ok(false);
                }
                _ if word.len() > 5 => {
                    return Err(self.error("Expected boolean value but too many characters"));
                }
                _ => {}
            }
        }

        if self.is_at_end() {
            return Err(self.error("Unexpected end of file while reading boolean"));
        }
        Err(self.error(format!("'{}' is not a boolean value", word)))
    }

    // ── Diagnostics ────────────────────────────────────────

    /// Raise a syntax error at the current line.
    ///
    /// Logs it, records it, and latches the reader into the invalid state.
    pub fn error(&mut self, message: impl Into<String>) -> ParseError {
        self.fail(DiagnosticKind::Syntax, message)
    }

    /// Record a non-fatal warning
    pub fn warning(&mut self, kind: DiagnosticKind, location: SourceInfo, message: impl Into<String>) {
        let diagnostic = Diagnostic::warning(kind, location, message);
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }

    /// Fail with the sticky error if one was already raised
    pub fn ensure_valid(&self) -> Result<(), ParseError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn fail(&mut self, kind: DiagnosticKind, message: impl Into<String>) -> ParseError {
        let err = ParseError::new(self.location(), message);
        let diagnostic = Diagnostic::error(kind, err.location.clone(), err.message.clone());
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
        self.failure.get_or_insert(err).clone()
    }

    // ── Character helpers ──────────────────────────────────

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied();
        if let Some(c) = ch {
            self.position += 1;
            if c == '\n' {
                self.line += 1;
            }
        }
        ch
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !is_whitespace(c) {
                break;
            }
            self.advance();
        }
    }
}

fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\n' || c == '\r'
}

/// Render a lookahead for error messages
pub(crate) fn describe(symbol: Option<char>) -> String {
    match symbol {
        Some(c) => format!("'{}'", c),
        None => "end of file".to_string(),
    }
}
