//! # slogd
//!
//! A log ingestion server that persists fixed-format records durably:
//! - Fixed 1024-byte records, identical on the wire and on disk
//! - Memory-mapped, fixed-size segment files
//! - Range commits every N records, rotation when a segment is full
//! - One coarse lock around append + commit + rotate
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │            (acceptor + fixed worker pool)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ header (96) + content (928)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  LogServerHandler                            │
//! │          (magic check, decode, console echo)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ LogRecord
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      LogPool                                 │
//! │            (append / commit / rotate, Mutex)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌───────────────┐
//!               │ MappedSegment │  log_YYYYMMDD_HHMMSS.txt
//!               │    (mmap)     │
//!               └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod segment;
pub mod pool;
pub mod network;
pub mod printer;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SlogError, Result};
pub use config::Config;
pub use pool::LogPool;
pub use record::{LogColor, LogHeader, LogRecord};
pub use segment::{AccessMode, MappedSegment};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of slogd
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
