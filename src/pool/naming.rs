//! Segment file naming
//!
//! `log_YYYYMMDD_HHMMSS.txt`, local time at creation. Rotations that land in
//! the same second get a `_<seq>` suffix.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// File name for a segment created at `timestamp`
///
/// `seq == 0` yields the plain name; later segments in the same second
/// append `_<seq>`.
pub fn segment_file_name(timestamp: &DateTime<Local>, seq: u32) -> String {
    let stamp = timestamp.format("%Y%m%d_%H%M%S");
    if seq == 0 {
        format!("log_{}.txt", stamp)
    } else {
        format!("log_{}_{}.txt", stamp, seq)
    }
}

/// Hands out collision-free segment paths within one directory
#[derive(Debug)]
pub struct SegmentNamer {
    dir: PathBuf,
    /// Second-granularity stamp of the last name handed out
    last_stamp: Option<i64>,
    next_seq: u32,
}

impl SegmentNamer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_stamp: None,
            next_seq: 0,
        }
    }

    /// Directory the names are resolved against
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Next unused path for a segment created at `timestamp`
    ///
    /// Names already present on disk are skipped as well, so a restart
    /// within the same second does not reuse a file.
    pub fn next_path(&mut self, timestamp: &DateTime<Local>) -> PathBuf {
        let stamp = timestamp.timestamp();
        if self.last_stamp != Some(stamp) {
            self.last_stamp = Some(stamp);
            self.next_seq = 0;
        }

        loop {
            let path = self.dir.join(segment_file_name(timestamp, self.next_seq));
            self.next_seq += 1;
            if !path.exists() {
                return path;
            }
        }
    }
}
