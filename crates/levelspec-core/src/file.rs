//! Document files - one root group bound to load, save and print

use std::fs;
use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::parser::document::Group;
use crate::parser::reader::Reader;
use crate::schemas::Schema;

/// A level document held in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFile {
    root: Group,
}

impl DocumentFile {
    /// Wrap an in-memory group; no I/O
    pub fn new(root: Group) -> Self {
        DocumentFile { root }
    }

    /// Load a document, falling back to an empty root on any failure.
    ///
    /// The failure has already been logged; use [`DocumentFile::try_load`]
    /// when the caller needs it.
    pub fn load(path: impl AsRef<Path>) -> Self {
        Self::try_load(path).unwrap_or_default()
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = open(path)?;
        let root = Group::load(&mut reader)?;
        tracing::debug!(path = %path.display(), fields = root.len(), "loaded document");
        Ok(DocumentFile { root })
    }

    /// Load a document with `schema` steering the parse, so that fields it
    /// declares as boolean can hold bare `true`/`false`
    pub fn load_with_schema(path: impl AsRef<Path>, schema: &Schema) -> Self {
        Self::try_load_with_schema(path, schema).unwrap_or_default()
    }

    pub fn try_load_with_schema(path: impl AsRef<Path>, schema: &Schema) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = open(path)?;
        let root = schema.load(&mut reader)?;
        tracing::debug!(
            path = %path.display(),
            schema = schema.name(),
            fields = root.len(),
            "loaded document"
        );
        Ok(DocumentFile { root })
    }

    /// Write the printed document to `path`, replacing its contents
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_text()).map_err(|err| {
            tracing::error!(path = %path.display(), error = %err, "unable to save document");
            Error::io(path, err)
        })?;
        tracing::debug!(path = %path.display(), "saved document");
        Ok(())
    }

    pub fn print(&self, out: &mut impl Write) -> std::io::Result<()> {
        out.write_all(self.to_text().as_bytes())
    }

    pub fn to_text(&self) -> String {
        self.root.to_text()
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    pub fn into_root(self) -> Group {
        self.root
    }

    /// SHA-256 of the printed form, as 64 lowercase hex digits.
    ///
    /// Formatting and source positions do not affect it, only content.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_text().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl From<Group> for DocumentFile {
    fn from(root: Group) -> Self {
        DocumentFile::new(root)
    }
}

/// Open a reader over `path`; failing to get the bytes at all is an `Io` error
fn open(path: &Path) -> Result<Reader> {
    let mut reader = Reader::open(path);
    match reader.take_io_error() {
        Some(err) => Err(Error::io(path, err)),
        None => Ok(reader),
    }
}
