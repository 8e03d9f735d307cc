//! Memory-mapped segment file
//!
//! Owns one file handle and its mapping. Closing (explicitly or on drop)
//! flushes a writable mapping, unmaps it and releases the file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapMut};

use crate::error::{Result, SlogError};

use super::AccessMode;

enum Mapping {
    ReadOnly(Mmap),
    ReadWrite(MmapMut),
}

struct OpenSegment {
    path: PathBuf,
    map: Mapping,
    /// Held so the handle lives exactly as long as the mapping
    _file: File,
}

/// A fixed-size memory-mapped file
///
/// ## Ownership
/// - Not `Clone`: one owner per mapping
/// - `take()` moves the mapping out and leaves this instance closed
/// - A default-constructed segment is closed
#[derive(Default)]
pub struct MappedSegment {
    inner: Option<OpenSegment>,
}

impl MappedSegment {
    /// Open a segment file
    ///
    /// On failure nothing stays open: the file handle and any mapping are
    /// dropped before the error is returned.
    pub fn open(path: impl AsRef<Path>, mode: AccessMode, size: u64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let (map, file) = match mode {
            AccessMode::ReadOnly => {
                let file = File::open(&path).map_err(|source| SlogError::CannotOpenFile {
                    path: path.clone(),
                    source,
                })?;
                let len = file_len(&file, &path)?;
                if len == 0 {
                    return Err(SlogError::EmptyFile { path });
                }
                // SAFETY: the file is not truncated while mapped by this process.
                let map = unsafe { Mmap::map(&file) }.map_err(|source| SlogError::CannotMapFile {
                    path: path.clone(),
                    size: len,
                    source,
                })?;
                (Mapping::ReadOnly(map), file)
            }
            AccessMode::CreateWithSize => {
                if size == 0 {
                    return Err(SlogError::ZeroSizeRequested { path });
                }
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&path)
                    .map_err(|source| SlogError::CannotOpenFile {
                        path: path.clone(),
                        source,
                    })?;
                file.set_len(size).map_err(|source| SlogError::CannotOpenFile {
                    path: path.clone(),
                    source,
                })?;
                (map_writable(&file, &path, size)?, file)
            }
            AccessMode::OpenExisting => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .open(&path)
                    .map_err(|source| SlogError::CannotOpenFile {
                        path: path.clone(),
                        source,
                    })?;
                let len = if size > 0 {
                    file.set_len(size).map_err(|source| SlogError::CannotOpenFile {
                        path: path.clone(),
                        source,
                    })?;
                    size
                } else {
                    file_len(&file, &path)?
                };
                if len == 0 {
                    return Err(SlogError::EmptyFile { path });
                }
                (map_writable(&file, &path, len)?, file)
            }
        };

        let segment = OpenSegment {
            path,
            map,
            _file: file,
        };
        tracing::debug!(
            "Opened segment {:?} ({:?}, {} bytes)",
            segment.path,
            mode,
            segment.len()
        );

        Ok(Self {
            inner: Some(segment),
        })
    }

    /// Whether a mapping is currently held
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Whether the mapping accepts writes
    pub fn is_writable(&self) -> bool {
        matches!(
            self.inner,
            Some(OpenSegment {
                map: Mapping::ReadWrite(_),
                ..
            })
        )
    }

    /// Backing file path, while open
    pub fn path(&self) -> Option<&Path> {
        self.inner.as_ref().map(|s| s.path.as_path())
    }

    /// Mapped bytes, while open
    pub fn data(&self) -> Option<&[u8]> {
        self.inner.as_ref().map(|s| match &s.map {
            Mapping::ReadOnly(m) => &m[..],
            Mapping::ReadWrite(m) => &m[..],
        })
    }

    /// Mutable mapped bytes
    ///
    /// Fails when closed or mapped read-only.
    pub fn data_mut(&mut self) -> Result<&mut [u8]> {
        match self.inner.as_mut() {
            None => Err(SlogError::SegmentClosed),
            Some(OpenSegment {
                map: Mapping::ReadOnly(_),
                ..
            }) => Err(SlogError::ReadOnlySegment),
            Some(OpenSegment {
                map: Mapping::ReadWrite(m),
                ..
            }) => Ok(&mut m[..]),
        }
    }

    /// Mapped size in bytes (0 when closed)
    pub fn size(&self) -> usize {
        self.inner.as_ref().map_or(0, OpenSegment::len)
    }

    /// Copy `bytes` into the mapping at `offset`, returning the written region
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<&mut [u8]> {
        let data = self.data_mut()?;
        let size = data.len();
        let end = checked_end(offset, bytes.len(), size)?;
        let dest = &mut data[offset..end];
        dest.copy_from_slice(bytes);
        Ok(dest)
    }

    /// Flush `[offset, offset + len)` to stable storage
    ///
    /// Once this returns `Ok`, the range survives a crash. A read-only
    /// mapping has nothing to flush.
    pub fn commit(&self, offset: usize, len: usize) -> Result<()> {
        let segment = self.inner.as_ref().ok_or(SlogError::SegmentClosed)?;
        checked_end(offset, len, segment.len())?;
        if len == 0 {
            return Ok(());
        }
        match &segment.map {
            Mapping::ReadOnly(_) => Ok(()),
            Mapping::ReadWrite(m) => {
                m.flush_range(offset, len)
                    .map_err(|source| SlogError::CommitFailed {
                        path: segment.path.clone(),
                        offset,
                        len,
                        source,
                    })?;
                tracing::trace!("Committed [{}, {}) of {:?}", offset, offset + len, segment.path);
                Ok(())
            }
        }
    }

    /// Flush the whole mapping
    pub fn commit_all(&self) -> Result<()> {
        self.commit(0, self.size())
    }

    /// Flush (if writable), unmap and release the file
    ///
    /// Closing an already-closed segment is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(segment) = self.inner.take() else {
            return Ok(());
        };
        let result = segment.flush_all();
        tracing::debug!("Closed segment {:?}", segment.path);
        result
    }

    /// Move the mapping out, leaving `self` closed
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl Drop for MappedSegment {
    fn drop(&mut self) {
        if let Some(segment) = self.inner.take() {
            if let Err(e) = segment.flush_all() {
                tracing::warn!("Final flush of {:?} failed: {}", segment.path, e);
            }
        }
    }
}

impl std::fmt::Debug for MappedSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedSegment")
            .field("path", &self.path())
            .field("size", &self.size())
            .field("writable", &self.is_writable())
            .finish()
    }
}

impl OpenSegment {
    fn len(&self) -> usize {
        match &self.map {
            Mapping::ReadOnly(m) => m.len(),
            Mapping::ReadWrite(m) => m.len(),
        }
    }

    fn flush_all(&self) -> Result<()> {
        match &self.map {
            Mapping::ReadOnly(_) => Ok(()),
            Mapping::ReadWrite(m) => m.flush().map_err(|source| SlogError::CommitFailed {
                path: self.path.clone(),
                offset: 0,
                len: m.len(),
                source,
            }),
        }
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

fn map_writable(file: &File, path: &Path, size: u64) -> Result<Mapping> {
    // SAFETY: the pool is the only writer of its segment files; no other
    // handle resizes the file while it is mapped.
    let map = unsafe { MmapMut::map_mut(file) }.map_err(|source| SlogError::CannotMapFile {
        path: path.to_path_buf(),
        size,
        source,
    })?;
    Ok(Mapping::ReadWrite(map))
}

fn file_len(file: &File, path: &Path) -> Result<u64> {
    file.metadata()
        .map(|m| m.len())
        .map_err(|source| SlogError::CannotOpenFile {
            path: path.to_path_buf(),
            source,
        })
}

fn checked_end(offset: usize, len: usize, size: usize) -> Result<usize> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(end),
        _ => Err(SlogError::OutOfBounds { offset, len, size }),
    }
}
