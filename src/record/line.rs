//! Log record
//!
//! A header plus its text payload, encoded to one 1024-byte stride.

use chrono::{DateTime, Local};

use crate::error::{Result, SlogError};

use super::header::truncate_str;
use super::{LogColor, LogHeader, CONTENT_SIZE, HEADER_SIZE, MAX_TEXT, OFFSET_CONTENT, RECORD_SIZE};

/// One log line as carried on the wire and stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub header: LogHeader,

    /// Payload text, at most `MAX_TEXT` bytes
    pub text: String,
}

impl LogRecord {
    /// Create a record stamped with the current local time
    pub fn new(signature: &str, tag: &str, color: LogColor, text: &str) -> Self {
        Self::with_header(LogHeader::new(signature, tag, color), text)
    }

    /// Create a record with an explicit timestamp
    pub fn with_timestamp(
        signature: &str,
        tag: &str,
        color: LogColor,
        text: &str,
        timestamp: &DateTime<Local>,
    ) -> Self {
        Self::with_header(LogHeader::with_timestamp(signature, tag, color, timestamp), text)
    }

    /// Create a record from a prepared header; `text` is truncated to capacity
    pub fn with_header(header: LogHeader, text: &str) -> Self {
        Self {
            header,
            text: truncate_str(text, MAX_TEXT).to_string(),
        }
    }

    /// Encode into a full record
    ///
    /// The content is NUL-padded and the final byte is always `'\n'`.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode into a record-sized buffer
    pub fn encode_into(&self, buf: &mut [u8; RECORD_SIZE]) {
        self.header.write_fields(&mut buf[..HEADER_SIZE]);

        let content = &mut buf[OFFSET_CONTENT..];
        content.fill(0);
        let text = truncate_str(&self.text, MAX_TEXT);
        content[..text.len()].copy_from_slice(text.as_bytes());
        buf[RECORD_SIZE - 1] = b'\n';
    }

    /// Decode a full 1024-byte record
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != RECORD_SIZE {
            return Err(SlogError::InvalidRecord(format!(
                "Record must be {} bytes, got {}",
                RECORD_SIZE,
                bytes.len()
            )));
        }
        Self::decode_parts(&bytes[..HEADER_SIZE], &bytes[HEADER_SIZE..])
    }

    /// Decode from separately delivered header and content bytes
    pub fn decode_parts(header: &[u8], content: &[u8]) -> Result<Self> {
        if content.len() > CONTENT_SIZE {
            return Err(SlogError::InvalidRecord(format!(
                "Content too large: {} bytes (max {})",
                content.len(),
                CONTENT_SIZE
            )));
        }
        let header = LogHeader::decode(header)?;

        let text = &content[..content.len().min(MAX_TEXT)];
        let end = text.iter().position(|&b| b == 0).unwrap_or(text.len());
        let text = String::from_utf8_lossy(&text[..end]).into_owned();

        Ok(Self { header, text })
    }

    /// Decode a record read back from a segment file
    ///
    /// Stored records have had their NUL padding turned into spaces, so
    /// trailing spaces are stripped from every text field. The color code is
    /// returned as stored.
    pub fn decode_stored(bytes: &[u8]) -> Result<Self> {
        let mut record = Self::decode(bytes)?;
        trim_padding(&mut record.header.timestamp);
        trim_padding(&mut record.header.signature);
        trim_padding(&mut record.header.tag);
        trim_padding(&mut record.text);
        Ok(record)
    }
}

/// Join separately framed header and content into one raw record
///
/// The bytes are kept exactly as received; only the lengths are checked.
pub fn assemble(header: &[u8], content: &[u8]) -> Result<[u8; RECORD_SIZE]> {
    if header.len() != HEADER_SIZE || content.len() != CONTENT_SIZE {
        return Err(SlogError::InvalidRecord(format!(
            "Expected {}+{} bytes, got {}+{}",
            HEADER_SIZE,
            CONTENT_SIZE,
            header.len(),
            content.len()
        )));
    }
    let mut raw = [0u8; RECORD_SIZE];
    raw[..HEADER_SIZE].copy_from_slice(header);
    raw[HEADER_SIZE..].copy_from_slice(content);
    Ok(raw)
}

/// Prepare an encoded record for storage
///
/// Forces the final byte to `'\n'` and rewrites every NUL to a space so
/// segment files stay readable by line-oriented text tools.
pub fn scrub(record: &mut [u8]) {
    if let Some(last) = record.last_mut() {
        *last = b'\n';
    }
    for b in record.iter_mut() {
        if *b == 0 {
            *b = b' ';
        }
    }
}

fn trim_padding(s: &mut String) {
    let len = s.trim_end_matches(' ').len();
    s.truncate(len);
}
