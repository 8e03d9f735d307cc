//! Log Pool Module
//!
//! Owns the active segment and applies the append / commit / rotate policy.
//!
//! ## State Machine
//! ```text
//!   write(record)
//!        │
//!        ▼
//!   append at current_count * 1024, current_count += 1
//!        │
//!        ├── current_count reached next_commit?
//!        │      commit [committed * 1024, next_commit * 1024)
//!        │      committed = next_commit, next_commit += interval
//!        │
//!        └── current_count == max_records?
//!               close segment, open log_YYYYMMDD_HHMMSS[_n].txt,
//!               reset counters
//! ```

mod log_pool;
mod naming;

pub use log_pool::LogPool;
pub use naming::{segment_file_name, SegmentNamer};
