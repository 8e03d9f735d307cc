//! Error types for slogd
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using SlogError
pub type Result<T> = std::result::Result<T, SlogError>;

/// Unified error type for slogd operations
#[derive(Debug, Error)]
pub enum SlogError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Segment Setup Errors
    // -------------------------------------------------------------------------
    #[error("Segment {path:?}: create mode requires a non-zero size")]
    ZeroSizeRequested { path: PathBuf },

    #[error("Segment {path:?}: cannot open file: {source}")]
    CannotOpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Segment {path:?}: cannot map {size} bytes: {source}")]
    CannotMapFile {
        path: PathBuf,
        size: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Segment {path:?}: file is empty")]
    EmptyFile { path: PathBuf },

    // -------------------------------------------------------------------------
    // Segment Runtime Errors
    // -------------------------------------------------------------------------
    #[error("Segment is closed")]
    SegmentClosed,

    #[error("Segment is mapped read-only")]
    ReadOnlySegment,

    #[error("Range out of bounds: offset {offset}, len {len}, segment size {size}")]
    OutOfBounds { offset: usize, len: usize, size: usize },

    #[error("Segment {path:?}: commit of {len} bytes at offset {offset} failed: {source}")]
    CommitFailed {
        path: PathBuf,
        offset: usize,
        len: usize,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Pool Errors
    // -------------------------------------------------------------------------
    #[error("Log pool unusable: {0}")]
    PoolUnusable(String),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SlogError {
    /// Whether the record was stored but its range is not yet durable
    ///
    /// A pool write that fails this way has already placed and counted the
    /// record. The pending range is retried at the next commit boundary and
    /// flushed again when the segment is closed.
    pub fn is_commit_failure(&self) -> bool {
        matches!(self, SlogError::CommitFailed { .. })
    }
}
