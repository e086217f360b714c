// Output file: newly created aliases are appended here, one per line.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to write aliases to {path}")]
pub struct StoreError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Append-only, line-oriented alias file.
#[derive(Debug, Clone)]
pub struct AliasStore {
    path: PathBuf,
}

impl AliasStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        AliasStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `aliases`. Nothing is created or opened for an empty slice.
    pub fn append(&self, aliases: &[String]) -> Result<(), StoreError> {
        if aliases.is_empty() {
            return Ok(());
        }
        self.write_lines(aliases).map_err(|source| StoreError {
            path: self.path.clone(),
            source,
        })
    }

    fn write_lines(&self, aliases: &[String]) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut out = BufWriter::new(file);
        for alias in aliases {
            writeln!(out, "{alias}")?;
        }
        out.flush()
    }
}
