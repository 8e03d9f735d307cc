//! Mapped Segment Module
//!
//! Fixed-size files accessed through an OS memory mapping.
//!
//! ## Responsibilities
//! - Open, create, or map read-only a file of fixed size
//! - Expose the mapped bytes while open
//! - Flush byte ranges (or everything) to stable storage
//! - Exclusive, move-only ownership of the mapping
//!
//! Platform differences are handled by `memmap2`; nothing above this module
//! knows which OS primitive backs the mapping.

mod mapped;

pub use mapped::MappedSegment;

/// How a segment file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Map an existing file read-only; `size` is ignored
    ReadOnly,

    /// Create (or truncate) the file and size it to exactly `size` bytes
    CreateWithSize,

    /// Open an existing file read-write; resized to `size` if non-zero
    OpenExisting,
}
