//! Binary Log Record Module
//!
//! Fixed-size record layout shared by the wire protocol and segment files.
//!
//! ## Responsibilities
//! - Define the 1024-byte record stride and its header layout
//! - Field-by-field encode/decode at fixed offsets (no struct reinterpretation)
//! - Cheap validity check on the magic marker
//!
//! ## Record Format
//! ```text
//! ┌──────────────────────────── Header (96) ─────────────────────────────┐
//! │Magic(4)│Pad(4)│Timestamp(24)│Signature(32)│Tag(16)│Color(4)│Rsvd(12) │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │ Content (928): NUL-padded text, final byte of the record is '\n'     │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The layout is part of the on-disk format: changing any offset breaks
//! existing segment files.

mod color;
mod header;
mod line;

pub use color::LogColor;
pub use header::{format_timestamp, LogHeader};
pub use line::{assemble, scrub, LogRecord};

/// Total record size in bytes (the segment stride)
pub const RECORD_SIZE: usize = 1024;

/// Header size in bytes
pub const HEADER_SIZE: usize = 96;

/// Content size in bytes
pub const CONTENT_SIZE: usize = RECORD_SIZE - HEADER_SIZE;

/// Longest text a record can carry (the last content byte is the terminator)
pub const MAX_TEXT: usize = CONTENT_SIZE - 1;

/// Protocol magic marker at offset 0
pub const MAGIC: [u8; 4] = *b"SLOG";

// -----------------------------------------------------------------------------
// Field widths
// -----------------------------------------------------------------------------
pub const MAGIC_SIZE: usize = 4;
pub const PADDING_SIZE: usize = 4;
pub const TIMESTAMP_SIZE: usize = 24;
pub const SIGNATURE_SIZE: usize = 32;
pub const TAG_SIZE: usize = 16;
pub const COLOR_SIZE: usize = 4;

// -----------------------------------------------------------------------------
// Field offsets
// -----------------------------------------------------------------------------
pub const OFFSET_MAGIC: usize = 0;
pub const OFFSET_TIMESTAMP: usize = OFFSET_MAGIC + MAGIC_SIZE + PADDING_SIZE; // 8
pub const OFFSET_SIGNATURE: usize = OFFSET_TIMESTAMP + TIMESTAMP_SIZE; // 32
pub const OFFSET_TAG: usize = OFFSET_SIGNATURE + SIGNATURE_SIZE; // 64
pub const OFFSET_COLOR: usize = OFFSET_TAG + TAG_SIZE; // 80
pub const OFFSET_RESERVED: usize = OFFSET_COLOR + COLOR_SIZE; // 84
pub const RESERVED_SIZE: usize = HEADER_SIZE - OFFSET_RESERVED; // 12
pub const OFFSET_CONTENT: usize = HEADER_SIZE;

/// Check whether `bytes` starts with the protocol magic marker.
///
/// This only inspects the first four bytes. It says nothing about the rest
/// of the record.
pub fn is_valid(bytes: &[u8]) -> bool {
    bytes.len() >= MAGIC_SIZE && bytes[OFFSET_MAGIC..OFFSET_MAGIC + MAGIC_SIZE] == MAGIC
}
