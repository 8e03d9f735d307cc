//! Log header
//!
//! Encodes and decodes the 96-byte header at fixed offsets.

use chrono::{DateTime, Local};

use crate::error::{Result, SlogError};

use super::{
    LogColor, COLOR_SIZE, HEADER_SIZE, MAGIC, MAGIC_SIZE, OFFSET_COLOR, OFFSET_MAGIC,
    OFFSET_SIGNATURE, OFFSET_TAG, OFFSET_TIMESTAMP, SIGNATURE_SIZE, TAG_SIZE, TIMESTAMP_SIZE,
};

/// Decoded record header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogHeader {
    /// Local time text, `YYYY-MM-DD HH:MM:SS:mmm|`
    pub timestamp: String,

    /// Originating function or module
    pub signature: String,

    /// Category
    pub tag: String,

    /// Raw color code (may be outside the palette)
    pub color: u32,
}

impl LogHeader {
    /// Create a header stamped with the current local time
    pub fn new(signature: &str, tag: &str, color: LogColor) -> Self {
        Self::with_timestamp(signature, tag, color, &Local::now())
    }

    /// Create a header with an explicit timestamp
    ///
    /// Signature and tag are truncated to their field widths here, so the
    /// struct always holds exactly what will be encoded.
    pub fn with_timestamp(
        signature: &str,
        tag: &str,
        color: LogColor,
        timestamp: &DateTime<Local>,
    ) -> Self {
        Self {
            timestamp: format_timestamp(timestamp),
            signature: truncate_str(signature, SIGNATURE_SIZE).to_string(),
            tag: truncate_str(tag, TAG_SIZE).to_string(),
            color: color.code(),
        }
    }

    /// Palette entry for the color code, if it is one
    pub fn color(&self) -> Option<LogColor> {
        LogColor::from_code(self.color)
    }

    /// Color code split into (r, g, b)
    pub fn rgb(&self) -> (u8, u8, u8) {
        super::color::rgb_of(self.color)
    }

    /// Write the header into `buf`
    ///
    /// Padding and reserved bytes are zeroed.
    pub fn encode_into(&self, buf: &mut [u8; HEADER_SIZE]) {
        self.write_fields(buf);
    }

    /// Encode to a standalone 96-byte array
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Field writer shared with the record encoder; `buf` is exactly
    /// `HEADER_SIZE` bytes
    pub(super) fn write_fields(&self, buf: &mut [u8]) {
        buf.fill(0);
        buf[OFFSET_MAGIC..OFFSET_MAGIC + MAGIC_SIZE].copy_from_slice(&MAGIC);
        put_str(buf, OFFSET_TIMESTAMP, TIMESTAMP_SIZE, &self.timestamp);
        put_str(buf, OFFSET_SIGNATURE, SIGNATURE_SIZE, &self.signature);
        put_str(buf, OFFSET_TAG, TAG_SIZE, &self.tag);
        buf[OFFSET_COLOR..OFFSET_COLOR + COLOR_SIZE].copy_from_slice(&self.color.to_le_bytes());
    }

    /// Decode a header, field by field
    ///
    /// Fails only when the input is short or the magic is wrong.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(SlogError::InvalidRecord(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }
        if !super::is_valid(bytes) {
            return Err(SlogError::InvalidRecord(format!(
                "Bad magic: {:02x?}",
                &bytes[OFFSET_MAGIC..OFFSET_MAGIC + MAGIC_SIZE]
            )));
        }

        let mut color = [0u8; COLOR_SIZE];
        color.copy_from_slice(&bytes[OFFSET_COLOR..OFFSET_COLOR + COLOR_SIZE]);

        Ok(Self {
            timestamp: get_str(bytes, OFFSET_TIMESTAMP, TIMESTAMP_SIZE),
            signature: get_str(bytes, OFFSET_SIGNATURE, SIGNATURE_SIZE),
            tag: get_str(bytes, OFFSET_TAG, TAG_SIZE),
            color: u32::from_le_bytes(color),
        })
    }
}

/// Format a timestamp as the 24-byte header text
///
/// `2024-03-05 14:07:09:042|`
pub fn format_timestamp(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S:%3f|").to_string()
}

// =============================================================================
// Field helpers
// =============================================================================

/// Longest prefix of `s` that fits in `max` bytes without splitting a char
pub(crate) fn truncate_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Copy `s` into `buf[offset..offset + width]`, NUL-padded
pub(crate) fn put_str(buf: &mut [u8], offset: usize, width: usize, s: &str) {
    let field = &mut buf[offset..offset + width];
    let s = truncate_str(s, width);
    field[..s.len()].copy_from_slice(s.as_bytes());
    field[s.len()..].fill(0);
}

/// Read `buf[offset..offset + width]` up to the first NUL
pub(crate) fn get_str(buf: &[u8], offset: usize, width: usize) -> String {
    let field = &buf[offset..offset + width];
    let end = field.iter().position(|&b| b == 0).unwrap_or(width);
    String::from_utf8_lossy(&field[..end]).into_owned()
}
