//! Tests for MappedSegment
//!
//! These tests verify:
//! - Open modes (create, open existing, read-only)
//! - Setup failures leave nothing open
//! - Range and full commits
//! - Close and ownership transfer

use std::fs;
use std::path::PathBuf;

use slogd::segment::{AccessMode, MappedSegment};
use slogd::SlogError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_segment() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("segment.txt");
    (temp_dir, path)
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_create_sizes_file() {
    let (_temp, path) = setup_temp_segment();

    let segment = MappedSegment::open(&path, AccessMode::CreateWithSize, 8192).unwrap();

    assert!(segment.is_open());
    assert!(segment.is_writable());
    assert_eq!(segment.size(), 8192);
    assert_eq!(segment.path(), Some(path.as_path()));
    assert_eq!(fs::metadata(&path).unwrap().len(), 8192);
    assert!(segment.data().unwrap().iter().all(|&b| b == 0));
}

#[test]
fn test_create_zero_size_fails() {
    let (_temp, path) = setup_temp_segment();

    let err = MappedSegment::open(&path, AccessMode::CreateWithSize, 0).unwrap_err();

    assert!(matches!(err, SlogError::ZeroSizeRequested { .. }));
    assert!(!path.exists());
}

#[test]
fn test_create_in_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("segment.txt");

    let err = MappedSegment::open(&path, AccessMode::CreateWithSize, 1024).unwrap_err();

    match err {
        SlogError::CannotOpenFile { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("Expected CannotOpenFile, got {:?}", other),
    }
}

#[test]
fn test_open_existing_missing_file_fails() {
    let (_temp, path) = setup_temp_segment();
    let err = MappedSegment::open(&path, AccessMode::OpenExisting, 0).unwrap_err();
    assert!(matches!(err, SlogError::CannotOpenFile { .. }));
    assert!(!path.exists());
}

#[cfg(unix)]
#[test]
fn test_mapping_a_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("not_a_segment");
    fs::create_dir(&dir).unwrap();
    // Non-empty so the directory reports a non-zero length everywhere
    fs::write(dir.join("entry"), b"x").unwrap();

    let err = MappedSegment::open(&dir, AccessMode::ReadOnly, 0).unwrap_err();
    match err {
        SlogError::CannotMapFile { path, size, .. } => {
            assert_eq!(path, dir);
            assert!(size > 0);
        }
        other => panic!("Expected CannotMapFile, got {:?}", other),
    }

    // Writable modes cannot even open it
    let err = MappedSegment::open(&dir, AccessMode::OpenExisting, 0).unwrap_err();
    assert!(matches!(err, SlogError::CannotOpenFile { .. }));

    // Nothing was left holding the directory or its contents
    assert_eq!(fs::read(dir.join("entry")).unwrap(), b"x");
    fs::remove_dir_all(&dir).unwrap();
    assert!(!dir.exists());
}

#[test]
fn test_open_existing_keeps_contents() {
    let (_temp, path) = setup_temp_segment();
    fs::write(&path, b"existing bytes").unwrap();

    let segment = MappedSegment::open(&path, AccessMode::OpenExisting, 0).unwrap();

    assert_eq!(segment.size(), 14);
    assert_eq!(segment.data().unwrap(), b"existing bytes");
}

#[test]
fn test_open_existing_resizes() {
    let (_temp, path) = setup_temp_segment();
    fs::write(&path, b"abc").unwrap();

    let segment = MappedSegment::open(&path, AccessMode::OpenExisting, 4096).unwrap();

    assert_eq!(segment.size(), 4096);
    assert_eq!(&segment.data().unwrap()[..3], b"abc");
}

#[test]
fn test_empty_file_fails() {
    let (_temp, path) = setup_temp_segment();
    fs::write(&path, b"").unwrap();

    let err = MappedSegment::open(&path, AccessMode::ReadOnly, 0).unwrap_err();
    assert!(matches!(err, SlogError::EmptyFile { .. }));

    let err = MappedSegment::open(&path, AccessMode::OpenExisting, 0).unwrap_err();
    assert!(matches!(err, SlogError::EmptyFile { .. }));
}

#[test]
fn test_read_only_rejects_writes() {
    let (_temp, path) = setup_temp_segment();
    fs::write(&path, b"read me").unwrap();

    let mut segment = MappedSegment::open(&path, AccessMode::ReadOnly, 0).unwrap();

    assert!(!segment.is_writable());
    assert_eq!(segment.data().unwrap(), b"read me");
    assert!(matches!(segment.data_mut(), Err(SlogError::ReadOnlySegment)));
    assert!(matches!(
        segment.write_at(0, b"x"),
        Err(SlogError::ReadOnlySegment)
    ));
    // Nothing to flush, still fine
    segment.commit_all().unwrap();
}

// =============================================================================
// Write / Commit Tests
// =============================================================================

#[test]
fn test_write_at_and_commit_visible_to_independent_reader() {
    let (_temp, path) = setup_temp_segment();
    let mut segment = MappedSegment::open(&path, AccessMode::CreateWithSize, 4096).unwrap();

    segment.write_at(1024, b"durable").unwrap();
    segment.commit(1024, 1024).unwrap();

    let on_disk = fs::read(&path).unwrap();
    assert_eq!(&on_disk[1024..1031], b"durable");
}

#[test]
fn test_write_out_of_bounds() {
    let (_temp, path) = setup_temp_segment();
    let mut segment = MappedSegment::open(&path, AccessMode::CreateWithSize, 16).unwrap();

    let err = segment.write_at(10, &[1u8; 10]).unwrap_err();
    assert!(matches!(err, SlogError::OutOfBounds { offset: 10, len: 10, size: 16 }));
}

#[test]
fn test_commit_out_of_bounds() {
    let (_temp, path) = setup_temp_segment();
    let segment = MappedSegment::open(&path, AccessMode::CreateWithSize, 4096).unwrap();

    assert!(matches!(
        segment.commit(4000, 200),
        Err(SlogError::OutOfBounds { .. })
    ));
    assert!(segment.commit(4096, 0).is_ok());
}

#[test]
fn test_commit_all() {
    let (_temp, path) = setup_temp_segment();
    let mut segment = MappedSegment::open(&path, AccessMode::CreateWithSize, 2048).unwrap();

    segment.data_mut().unwrap().fill(b'a');
    segment.commit_all().unwrap();

    assert!(fs::read(&path).unwrap().iter().all(|&b| b == b'a'));
}

#[test]
fn test_reopen_after_close_sees_data() {
    let (_temp, path) = setup_temp_segment();
    {
        let mut segment = MappedSegment::open(&path, AccessMode::CreateWithSize, 1024).unwrap();
        segment.write_at(0, b"persisted").unwrap();
        // Dropped without an explicit commit
    }

    let segment = MappedSegment::open(&path, AccessMode::ReadOnly, 0).unwrap();
    assert_eq!(&segment.data().unwrap()[..9], b"persisted");
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let (_temp, path) = setup_temp_segment();
    let mut segment = MappedSegment::open(&path, AccessMode::CreateWithSize, 1024).unwrap();

    segment.close().unwrap();
    assert!(!segment.is_open());
    assert_eq!(segment.size(), 0);
    assert!(segment.data().is_none());
    assert!(segment.path().is_none());

    segment.close().unwrap();
}

#[test]
fn test_closed_segment_rejects_operations() {
    let mut segment = MappedSegment::default();

    assert!(!segment.is_open());
    assert!(matches!(segment.commit(0, 0), Err(SlogError::SegmentClosed)));
    assert!(matches!(segment.data_mut(), Err(SlogError::SegmentClosed)));
    assert!(matches!(segment.write_at(0, b""), Err(SlogError::SegmentClosed)));
}

#[test]
fn test_take_moves_ownership() {
    let (_temp, path) = setup_temp_segment();
    let mut source = MappedSegment::open(&path, AccessMode::CreateWithSize, 1024).unwrap();

    let mut moved = source.take();

    assert!(!source.is_open());
    assert!(source.data().is_none());
    assert!(moved.is_open());
    assert_eq!(moved.size(), 1024);
    moved.write_at(0, b"owner").unwrap();

    // Closing the empty source must not affect the new owner
    source.close().unwrap();
    assert_eq!(&moved.data().unwrap()[..5], b"owner");
}

#[test]
fn test_create_truncates_existing_file() {
    let (_temp, path) = setup_temp_segment();
    fs::write(&path, vec![b'z'; 4096]).unwrap();

    let segment = MappedSegment::open(&path, AccessMode::CreateWithSize, 2048).unwrap();

    assert_eq!(segment.size(), 2048);
    assert!(segment.data().unwrap().iter().all(|&b| b == 0));
}
