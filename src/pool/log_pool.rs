//! Log Pool
//!
//! Appends records into the active segment, commits at fixed record
//! intervals and rotates to a fresh segment when the active one is full.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use crate::config::{self, Config};
use crate::error::{Result, SlogError};
use crate::record::{scrub, LogRecord, RECORD_SIZE};
use crate::segment::{AccessMode, MappedSegment};

use super::SegmentNamer;

/// The only write entry point into segment storage
///
/// ## Concurrency Model
/// One coarse lock covers append, commit and rotation. A writer never
/// observes a half-rotated pool, and two writers never share an offset.
/// `write()` blocks for the duration of an msync or a rotation; that is
/// the back-pressure applied to connection workers.
pub struct LogPool {
    /// Segment capacity in records
    max_records: usize,

    /// Records between forced commits
    commit_interval: usize,

    /// Segment file size in bytes
    segment_size: u64,

    /// Everything that changes per write
    state: Mutex<PoolState>,
}

struct PoolState {
    segment: MappedSegment,
    namer: SegmentNamer,

    /// Records written into the active segment
    current_count: usize,

    /// Record boundary up to which the active segment is durable
    committed_count: usize,

    /// Record boundary that triggers the next commit
    next_commit: usize,

    segments_created: u64,
    records_written: u64,

    /// Set when a rotation failed; the pool has no segment afterwards
    failure: Option<String>,
}

impl LogPool {
    /// Open a pool in `config.data_dir` and create its first segment
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(&config.data_dir, config.max_records, config.commit_interval)
    }

    /// Open a pool with explicit capacity and commit interval
    ///
    /// Fails if the first segment cannot be created.
    pub fn new(dir: &Path, max_records: usize, commit_interval: usize) -> Result<Self> {
        if max_records == 0 || commit_interval == 0 {
            return Err(SlogError::Config(format!(
                "max_records ({}) and commit_interval ({}) must be greater than 0",
                max_records, commit_interval
            )));
        }
        let segment_size = config::segment_size(max_records)?;
        fs::create_dir_all(dir)?;

        let mut namer = SegmentNamer::new(dir);
        let segment = Self::create_segment(&mut namer, segment_size)?;

        tracing::info!(
            "Log pool ready in {:?}: {} records per segment, commit every {}",
            dir,
            max_records,
            commit_interval
        );

        Ok(Self {
            max_records,
            commit_interval,
            segment_size,
            state: Mutex::new(PoolState {
                segment,
                namer,
                current_count: 0,
                committed_count: 0,
                next_commit: commit_interval,
                segments_created: 1,
                records_written: 0,
                failure: None,
            }),
        })
    }

    /// Append one record
    pub fn write(&self, record: &LogRecord) -> Result<()> {
        self.write_raw(&record.encode())
    }

    /// Append one record exactly as received
    ///
    /// Steps (all under the pool lock):
    /// 1. Copy into the stride at `current_count * RECORD_SIZE` and scrub it
    /// 2. Commit the pending range if the commit boundary was reached
    /// 3. Rotate if the segment is full
    ///
    /// A [`SlogError::CommitFailed`] here means the record was stored and
    /// counted but is not durable yet; see [`SlogError::is_commit_failure`].
    /// A failed rotation also follows a stored record, and it leaves the pool
    /// unusable. Any other error means the record was not stored.
    pub fn write_raw(&self, bytes: &[u8; RECORD_SIZE]) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.failure {
            return Err(SlogError::PoolUnusable(reason.clone()));
        }

        // A full segment is never left active, but recover if one is
        if state.current_count >= self.max_records {
            self.rotate(&mut state)?;
        }

        // Step 1: Append
        let offset = state.current_count * RECORD_SIZE;
        let dest = state.segment.write_at(offset, bytes)?;
        scrub(dest);
        state.current_count += 1;
        state.records_written += 1;

        // Step 2: Commit
        let committed = if state.current_count >= state.next_commit {
            self.commit_pending(&mut state)
        } else {
            Ok(())
        };

        // Step 3: Rotate
        self.settle(&mut state, committed)
    }

    /// Close the active segment, surfacing the final flush error
    pub fn close(self) -> Result<()> {
        let mut state = self.state.into_inner();
        tracing::info!(
            "Closing log pool after {} records in {} segments",
            state.records_written,
            state.segments_created
        );
        state.segment.close()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Records in the active segment
    pub fn current_count(&self) -> usize {
        self.state.lock().current_count
    }

    /// Durable record boundary of the active segment
    pub fn committed_count(&self) -> usize {
        self.state.lock().committed_count
    }

    /// Path of the active segment (`None` after a failed rotation)
    pub fn current_path(&self) -> Option<PathBuf> {
        self.state.lock().segment.path().map(Path::to_path_buf)
    }

    /// Segments created since the pool was opened
    pub fn segments_created(&self) -> u64 {
        self.state.lock().segments_created
    }

    /// Records accepted since the pool was opened
    pub fn records_written(&self) -> u64 {
        self.state.lock().records_written
    }

    /// Whether a failed rotation left the pool without a segment
    pub fn is_usable(&self) -> bool {
        self.state.lock().failure.is_none()
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    pub fn commit_interval(&self) -> usize {
        self.commit_interval
    }

    /// Directory receiving segment files
    pub fn dir(&self) -> PathBuf {
        self.state.lock().namer.dir().to_path_buf()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Flush `[committed_count, next_commit)` and advance the boundary
    ///
    /// On failure the counters stay put so the next write retries the range.
    fn commit_pending(&self, state: &mut PoolState) -> Result<()> {
        let start = state.committed_count * RECORD_SIZE;
        let end = state.next_commit * RECORD_SIZE;
        state.segment.commit(start, end - start)?;
        state.committed_count = state.next_commit;
        state.next_commit += self.commit_interval;
        Ok(())
    }

    /// Rotate a full segment whatever the commit outcome
    ///
    /// Closing the full segment flushes all of it, so a successful rotation
    /// supersedes a failed commit.
    fn settle(&self, state: &mut PoolState, committed: Result<()>) -> Result<()> {
        if state.current_count < self.max_records {
            return committed;
        }
        if let Err(e) = committed {
            tracing::warn!("Commit failed on a full segment, rotating anyway: {}", e);
        }
        self.rotate(state)
    }

    /// Replace the full segment with a fresh one (called with the lock held)
    fn rotate(&self, state: &mut PoolState) -> Result<()> {
        let mut full = state.segment.take();
        let full_path = full.path().map(Path::to_path_buf);
        let closed = full.close();
        if let Err(ref e) = closed {
            tracing::error!("Closing full segment {:?} failed: {}", full_path, e);
        }

        state.current_count = 0;
        state.committed_count = 0;
        state.next_commit = self.commit_interval;

        match Self::create_segment(&mut state.namer, self.segment_size) {
            Ok(segment) => {
                tracing::info!(
                    "Rotated segment {:?} -> {:?}",
                    full_path,
                    segment.path()
                );
                state.segment = segment;
                state.segments_created += 1;
                closed
            }
            Err(e) => {
                tracing::error!("Rotation failed, log pool is unusable: {}", e);
                state.failure = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn create_segment(namer: &mut SegmentNamer, size: u64) -> Result<MappedSegment> {
        let path = namer.next_path(&Local::now());
        MappedSegment::open(&path, AccessMode::CreateWithSize, size)
    }
}
