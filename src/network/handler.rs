//! Log server handler
//!
//! Bridges framed records into the log pool.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::pool::LogPool;
use crate::printer::LogPrinter;
use crate::record::{self, LogRecord};

use super::RecordHandler;

/// Validates, echoes and persists incoming records
pub struct LogServerHandler {
    pool: Arc<LogPool>,
    echo: bool,
    accepted: AtomicU64,
    dropped: AtomicU64,
}

impl LogServerHandler {
    pub fn new(pool: Arc<LogPool>, echo: bool) -> Self {
        Self {
            pool,
            echo,
            accepted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Records handed to the pool
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Records dropped for a bad magic marker
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn pool(&self) -> &Arc<LogPool> {
        &self.pool
    }
}

impl RecordHandler for LogServerHandler {
    fn on_connected(&self, peer: &str) {
        tracing::info!("Log client connected: {}", peer);
    }

    fn on_disconnected(&self, peer: &str) {
        tracing::info!("Log client disconnected: {}", peer);
    }

    fn on_record(&self, header: &[u8], content: &[u8]) -> Result<()> {
        // Malformed records never reach the pool
        if !record::is_valid(header) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                "Dropping record with bad magic {:02x?}",
                &header[..header.len().min(record::MAGIC_SIZE)]
            );
            return Ok(());
        }

        // Stored byte for byte; decoding is only for the console
        let raw = record::assemble(header, content)?;
        if self.echo {
            match LogRecord::decode_parts(header, content) {
                Ok(line) => LogPrinter::print(&line),
                Err(e) => tracing::debug!("Echo skipped: {}", e),
            }
        }

        match self.pool.write_raw(&raw) {
            Ok(()) => {}
            Err(e) if e.is_commit_failure() => {
                // Stored, and retried at the next boundary
                tracing::warn!("Record stored but not yet durable: {}", e);
            }
            Err(e) => {
                tracing::error!("Log pool write failed: {}", e);
                return Err(e);
            }
        }
        self.accepted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
