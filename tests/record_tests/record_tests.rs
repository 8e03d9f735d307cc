//! Tests for the Binary Log Record
//!
//! These tests verify:
//! - Fixed byte layout of header fields
//! - Truncation of signature, tag and text
//! - Field-by-field decoding
//! - Magic-only validity check
//! - Scrubbing for storage

use chrono::{Local, TimeZone};
use slogd::record::{
    self, format_timestamp, scrub, LogColor, LogHeader, LogRecord, CONTENT_SIZE, HEADER_SIZE,
    MAX_TEXT, OFFSET_COLOR, OFFSET_CONTENT, OFFSET_SIGNATURE, OFFSET_TAG, OFFSET_TIMESTAMP,
    RECORD_SIZE,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn fixed_time() -> chrono::DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
        .single()
        .unwrap()
        + chrono::Duration::milliseconds(42)
}

fn sample(text: &str) -> LogRecord {
    LogRecord::with_timestamp("Module::function", "NET", LogColor::Teal, text, &fixed_time())
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_layout_constants() {
    assert_eq!(RECORD_SIZE, 1024);
    assert_eq!(HEADER_SIZE, 96);
    assert_eq!(CONTENT_SIZE, 928);
    assert_eq!(MAX_TEXT, 927);
    assert_eq!(OFFSET_TIMESTAMP, 8);
    assert_eq!(OFFSET_SIGNATURE, 32);
    assert_eq!(OFFSET_TAG, 64);
    assert_eq!(OFFSET_COLOR, 80);
    assert_eq!(OFFSET_CONTENT, 96);
}

#[test]
fn test_encode_field_positions() {
    let bytes = sample("hello").encode();

    assert_eq!(&bytes[0..4], b"SLOG");
    assert_eq!(&bytes[4..8], &[0u8; 4]);
    assert_eq!(&bytes[8..32], b"2024-03-05 14:07:09:042|");
    assert_eq!(&bytes[32..48], b"Module::function");
    assert!(bytes[48..64].iter().all(|&b| b == 0));
    assert_eq!(&bytes[64..67], b"NET");
    assert_eq!(&bytes[80..84], &0x008080u32.to_le_bytes());
    assert_eq!(&bytes[84..96], &[0u8; 12]);
    assert_eq!(&bytes[96..101], b"hello");
    assert!(bytes[101..1023].iter().all(|&b| b == 0));
    assert_eq!(bytes[1023], b'\n');
}

#[test]
fn test_timestamp_format_is_24_bytes() {
    let text = format_timestamp(&fixed_time());
    assert_eq!(text, "2024-03-05 14:07:09:042|");
    assert_eq!(text.len(), 24);
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_long_text_truncated_to_capacity() {
    let long = "x".repeat(2000);
    let record = sample(&long);
    assert_eq!(record.text.len(), MAX_TEXT);

    let bytes = record.encode();
    assert!(bytes[OFFSET_CONTENT..RECORD_SIZE - 1].iter().all(|&b| b == b'x'));
    assert_eq!(bytes[RECORD_SIZE - 1], b'\n');
}

#[test]
fn test_text_at_capacity_is_kept() {
    let exact = "y".repeat(MAX_TEXT);
    let decoded = LogRecord::decode(&sample(&exact).encode()).unwrap();
    assert_eq!(decoded.text, exact);
}

#[test]
fn test_signature_and_tag_truncated_to_field_width() {
    let record = LogRecord::with_timestamp(
        &"s".repeat(50),
        &"t".repeat(20),
        LogColor::Red,
        "body",
        &fixed_time(),
    );
    assert_eq!(record.header.signature.len(), 32);
    assert_eq!(record.header.tag.len(), 16);

    let bytes = record.encode();
    assert!(bytes[32..64].iter().all(|&b| b == b's'));
    assert!(bytes[64..80].iter().all(|&b| b == b't'));
    // The tag must not spill into the color field
    assert_eq!(&bytes[80..84], &LogColor::Red.code().to_le_bytes());
}

#[test]
fn test_truncation_keeps_utf8_intact() {
    // 'é' is two bytes; 17 of them straddle the 32-byte signature limit
    let record = LogRecord::with_timestamp(&"é".repeat(17), "t", LogColor::Blue, "", &fixed_time());
    assert_eq!(record.header.signature, "é".repeat(16));
}

// =============================================================================
// Decode Tests
// =============================================================================

#[test]
fn test_decode_reproduces_fields() {
    let original = sample("decode me");
    let decoded = LogRecord::decode(&original.encode()).unwrap();

    assert_eq!(decoded, original);
    assert_eq!(decoded.header.color(), Some(LogColor::Teal));
}

#[test]
fn test_decode_parts_matches_decode() {
    let bytes = sample("split").encode();
    let whole = LogRecord::decode(&bytes).unwrap();
    let parts = LogRecord::decode_parts(&bytes[..HEADER_SIZE], &bytes[HEADER_SIZE..]).unwrap();
    assert_eq!(whole, parts);
}

#[test]
fn test_decode_rejects_wrong_length() {
    let bytes = sample("x").encode();
    assert!(LogRecord::decode(&bytes[..1000]).is_err());
}

#[test]
fn test_decode_rejects_bad_magic() {
    let mut bytes = sample("x").encode();
    bytes[0] = b'X';
    assert!(LogRecord::decode(&bytes).is_err());
}

#[test]
fn test_unknown_color_code_decodes() {
    let mut bytes = sample("x").encode();
    bytes[80..84].copy_from_slice(&0x00123456u32.to_le_bytes());

    let decoded = LogRecord::decode(&bytes).unwrap();
    assert_eq!(decoded.header.color, 0x00123456);
    assert_eq!(decoded.header.color(), None);
    assert_eq!(decoded.header.rgb(), (0x12, 0x34, 0x56));
}

#[test]
fn test_header_encode_decode() {
    let header = LogHeader::with_timestamp("sig", "tag", LogColor::Olive, &fixed_time());
    let decoded = LogHeader::decode(&header.encode()).unwrap();
    assert_eq!(decoded, header);
}

#[test]
fn test_assemble_keeps_raw_bytes() {
    let mut bytes = sample("x").encode();
    bytes[90] = 0xee;
    let mut content = [0u8; CONTENT_SIZE];
    content[..4].copy_from_slice(b"a\0\xfe\0");

    let raw = record::assemble(&bytes[..HEADER_SIZE], &content).unwrap();

    assert_eq!(raw[90], 0xee);
    assert_eq!(&raw[OFFSET_CONTENT..OFFSET_CONTENT + 4], b"a\0\xfe\0");
    assert!(record::assemble(&bytes[..HEADER_SIZE], &content[..10]).is_err());
    assert!(record::assemble(&bytes[..50], &content).is_err());
}

#[test]
fn test_header_encode_into_fixed_buffer() {
    let header = sample("x").header;
    let mut buf = [0xffu8; HEADER_SIZE];
    header.encode_into(&mut buf);
    assert_eq!(buf, header.encode());
}

// =============================================================================
// Validity Tests
// =============================================================================

#[test]
fn test_is_valid_checks_magic_only() {
    let mut bytes = [0u8; RECORD_SIZE];
    assert!(!record::is_valid(&bytes));

    bytes[..4].copy_from_slice(b"SLOG");
    // Everything after the magic is garbage, still "valid"
    assert!(record::is_valid(&bytes));
}

#[test]
fn test_is_valid_short_input() {
    assert!(!record::is_valid(b"SLO"));
    assert!(record::is_valid(b"SLOG"));
}

// =============================================================================
// Scrub Tests
// =============================================================================

#[test]
fn test_scrub_rewrites_nul_and_forces_newline() {
    let mut bytes = sample("short").encode();
    bytes[RECORD_SIZE - 1] = b'z';
    scrub(&mut bytes);

    assert!(!bytes.contains(&0));
    assert_eq!(bytes[RECORD_SIZE - 1], b'\n');
    assert_eq!(&bytes[OFFSET_CONTENT..OFFSET_CONTENT + 6], b"short ");
}

#[test]
fn test_decode_stored_trims_padding() {
    let original = sample("stored text");
    let mut bytes = original.encode();
    scrub(&mut bytes);

    let stored = LogRecord::decode_stored(&bytes).unwrap();
    assert_eq!(stored.text, "stored text");
    assert_eq!(stored.header.signature, "Module::function");
    assert_eq!(stored.header.tag, "NET");
    assert_eq!(stored.header.timestamp, original.header.timestamp);
}

// =============================================================================
// Color Tests
// =============================================================================

#[test]
fn test_palette_codes() {
    assert_eq!(LogColor::ALL.len(), 12);
    assert_eq!(LogColor::Blue.code(), 0x1E90FF);
    assert_eq!(LogColor::Olive.code(), 0x6B8E23);
    assert_eq!(LogColor::Orange.rgb(), (0xFF, 0x8C, 0x00));
    for color in LogColor::ALL {
        assert_eq!(LogColor::from_code(color.code()), Some(color));
    }
}
