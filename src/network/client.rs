//! Log client
//!
//! Blocking sender of encoded records, plus the synthetic load generator.

use std::io::{BufWriter, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use rand::seq::SliceRandom;

use crate::error::{Result, SlogError};
use crate::record::{LogColor, LogRecord, RECORD_SIZE};

/// Sends records to a slogd server
pub struct LogClient {
    writer: BufWriter<TcpStream>,
}

impl LogClient {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| SlogError::Network(format!("Cannot connect: {}", e)))?;
        stream.set_nodelay(true)?;
        Ok(Self {
            writer: BufWriter::new(stream),
        })
    }

    /// Send one record (buffered; call `flush` to push it out)
    pub fn send(&mut self, record: &LogRecord) -> Result<()> {
        self.send_raw(&record.encode())
    }

    /// Send pre-encoded bytes as one record
    pub fn send_raw(&mut self, bytes: &[u8; RECORD_SIZE]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and half-close the connection so the server sees EOF
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().shutdown(Shutdown::Write)?;
        Ok(())
    }
}

/// Send `count` sample records to `addr`, pausing `interval` between them
///
/// Colors are picked at random from the palette. Returns the number sent.
pub fn send_test_logs(addr: impl ToSocketAddrs, count: usize, interval: Duration) -> Result<usize> {
    let mut client = LogClient::connect(addr)?;
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let color = LogColor::ALL
            .choose(&mut rng)
            .copied()
            .unwrap_or(LogColor::Blue);
        let record = LogRecord::new(
            "LogClient::send_test_logs",
            "TEST",
            color,
            &format!("Sample LogLine Protocol Test #{}", i),
        );
        client.send(&record)?;

        if !interval.is_zero() {
            client.flush()?;
            thread::sleep(interval);
        }
    }

    client.finish()?;
    Ok(count)
}
