//! Configuration for slogd
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, SlogError};
use crate::record::RECORD_SIZE;

/// Main configuration for a slogd instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory receiving segment files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── log_20240101_120000.txt
    ///     ├── log_20240101_120000_1.txt   (same-second rotation)
    ///     └── ...
    pub data_dir: PathBuf,

    /// Segment capacity in records (each record is one 1024-byte stride)
    pub max_records: usize,

    /// Records between forced range commits (msync)
    pub commit_interval: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Connection worker threads (one connection per worker at a time)
    pub workers: usize,

    /// Connection read timeout (milliseconds), used to poll for shutdown.
    /// Zero disables the timeout.
    pub read_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Presentation
    // -------------------------------------------------------------------------
    /// Echo every accepted record to stdout in its color
    pub echo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./slogd_data"),
            max_records: 4096,
            commit_interval: 64,
            listen_addr: "0.0.0.0:13579".to_string(),
            workers: 4,
            read_timeout_ms: 1000,
            echo: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_records == 0 {
            return Err(SlogError::Config("max_records must be greater than 0".to_string()));
        }
        segment_size(self.max_records)?;
        if self.commit_interval == 0 {
            return Err(SlogError::Config(
                "commit_interval must be greater than 0".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(SlogError::Config("workers must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Segment file size in bytes for `max_records` records
pub(crate) fn segment_size(max_records: usize) -> Result<u64> {
    max_records
        .checked_mul(RECORD_SIZE)
        .and_then(|bytes| u64::try_from(bytes).ok())
        .ok_or_else(|| {
            SlogError::Config(format!(
                "max_records ({}) overflows the segment size",
                max_records
            ))
        })
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (where segment files are created)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the segment capacity (in records)
    pub fn max_records(mut self, count: usize) -> Self {
        self.config.max_records = count;
        self
    }

    /// Set the commit interval (in records)
    pub fn commit_interval(mut self, count: usize) -> Self {
        self.config.commit_interval = count;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of connection workers
    pub fn workers(mut self, count: usize) -> Self {
        self.config.workers = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Enable or disable console echo
    pub fn echo(mut self, enabled: bool) -> Self {
        self.config.echo = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
