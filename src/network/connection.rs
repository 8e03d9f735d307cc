//! Connection Handler
//!
//! Frames the byte stream of one client into records.

use std::io::{BufReader, ErrorKind, Read};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SlogError};
use crate::record::{CONTENT_SIZE, HEADER_SIZE};

use super::RecordHandler;

/// Outcome of filling one frame buffer
enum Fill {
    Complete,
    /// Clean end of stream before the first byte of the frame
    Eof,
    /// Shutdown was requested while waiting for data
    Shutdown,
}

/// Handles a single client connection
pub struct Connection<H: RecordHandler> {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// Receives every complete record
    handler: Arc<H>,

    /// Server-wide shutdown flag, checked on read timeouts
    shutdown: Arc<AtomicBool>,

    /// Peer address for logging
    peer_addr: String,
}

impl<H: RecordHandler> Connection<H> {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, handler: Arc<H>, shutdown: Arc<AtomicBool>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nonblocking(false)?;
        stream.set_nodelay(true)?;

        Ok(Self {
            reader: BufReader::new(stream),
            handler,
            shutdown,
            peer_addr,
        })
    }

    /// Configure the read timeout used to poll the shutdown flag
    pub fn set_read_timeout(&mut self, read_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads records in a loop. Returns when the client disconnects, the
    /// server shuts down, or the handler fails.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);
        self.handler.on_connected(&self.peer_addr);

        let result = self.record_loop();

        self.handler.on_disconnected(&self.peer_addr);
        result
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    fn record_loop(&mut self) -> Result<()> {
        let mut header = [0u8; HEADER_SIZE];
        let mut content = [0u8; CONTENT_SIZE];

        loop {
            match self.fill(&mut header, true)? {
                Fill::Complete => {}
                Fill::Eof => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Fill::Shutdown => return Ok(()),
            }
            match self.fill(&mut content, false)? {
                Fill::Complete => {}
                Fill::Eof | Fill::Shutdown => return Ok(()),
            }

            tracing::trace!("Received record from {}", self.peer_addr);
            self.handler.on_record(&header, &content)?;
        }
    }

    /// Fill `buf` completely, surviving read timeouts
    ///
    /// `frame_start` marks the header read, where EOF is a clean disconnect.
    fn fill(&mut self, buf: &mut [u8], frame_start: bool) -> Result<Fill> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 && frame_start => return Ok(Fill::Eof),
                Ok(0) => {
                    return Err(SlogError::Protocol(format!(
                        "Client {} closed mid-record ({} of {} bytes)",
                        self.peer_addr,
                        filled,
                        buf.len()
                    )))
                }
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                // Read timeout (Windows uses TimedOut instead of WouldBlock)
                Err(ref e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    if self.shutdown.load(Ordering::Relaxed) {
                        tracing::debug!("Closing {} for shutdown", self.peer_addr);
                        return Ok(Fill::Shutdown);
                    }
                }
                Err(ref e)
                    if matches!(
                        e.kind(),
                        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
                    ) =>
                {
                    tracing::debug!("Connection reset by client {}", self.peer_addr);
                    return Ok(Fill::Eof);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Fill::Complete)
    }
}
