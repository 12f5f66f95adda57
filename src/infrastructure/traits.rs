//! I/O boundary traits for testability
//!
//! These traits abstract external collaborators (filesystem, tree
//! construction, retrieval, ingestion) so services can be tested with
//! in-memory implementations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{Document, IngestionItem};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents as bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Failure to build a document tree from raw bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error at byte {position}: {message}")]
pub struct ParseError {
    /// Byte offset into the input where the failure was detected
    pub position: u64,
    pub message: String,
}

/// Tree construction: raw document bytes to a navigable [`Document`].
pub trait TreeProvider: Send + Sync {
    /// Parse `bytes` and return the subtree rooted at the first element
    /// named `root_tag`.
    fn parse(&self, bytes: &[u8], root_tag: &str) -> Result<Document, ParseError>;
}

/// Why a single source could not be retrieved.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("unsupported source: {0}")]
    Unsupported(String),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

/// Result for one source of a retrieval batch.
#[derive(Debug)]
pub struct FetchOutcome {
    pub source: String,
    /// Path of the stored (decompressed) file
    pub result: Result<PathBuf, FetchError>,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Retrieval: fetch (and decompress) sources into a destination directory.
///
/// Every source completes or fails on its own; one failure never aborts the
/// batch. At most `concurrency_limit` sources are in flight at once.
pub trait Retriever: Send + Sync {
    fn fetch_all(
        &self,
        sources: &[String],
        dest_dir: &Path,
        concurrency_limit: usize,
    ) -> Vec<FetchOutcome>;
}

/// Downstream consumer of projected records.
pub trait IngestionSink: Send + Sync {
    fn ingest(&self, item: &IngestionItem) -> io::Result<()>;

    /// Flush buffered items.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}
