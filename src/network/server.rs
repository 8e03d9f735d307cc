//! TCP Server
//!
//! Accepts connections and dispatches them to a fixed pool of workers.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, SendTimeoutError};

use crate::config::Config;
use crate::error::{Result, SlogError};

use super::{Connection, RecordHandler};

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// How long the acceptor waits for a free worker before rechecking shutdown
const DISPATCH_POLL: Duration = Duration::from_millis(100);

/// Clonable handle that stops a running server
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// TCP server for slogd
pub struct Server<H: RecordHandler> {
    config: Config,
    handler: Arc<H>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl<H: RecordHandler> Server<H> {
    /// Bind the listener
    pub fn bind(config: Config, handler: Arc<H>) -> Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            SlogError::Network(format!("Cannot bind {}: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            handler,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&self) -> Result<()> {
        tracing::info!(
            "Listening on {} with {} workers",
            self.local_addr()?,
            self.config.workers
        );

        let (tx, rx) = channel::bounded::<TcpStream>(self.config.workers);
        let mut workers = Vec::with_capacity(self.config.workers);
        for id in 0..self.config.workers {
            workers.push(self.spawn_worker(id, rx.clone())?);
        }
        drop(rx);

        let result = self.accept_loop(&tx);

        // Closing the channel lets idle workers exit
        drop(tx);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Connection worker panicked");
            }
        }

        tracing::info!("Server stopped");
        result
    }

    fn accept_loop(&self, tx: &channel::Sender<TcpStream>) -> Result<()> {
        while !self.shutdown.load(Ordering::Relaxed) {
            let (stream, addr) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            };
            tracing::debug!("Accepted connection from {}", addr);

            // Blocks while every worker is busy
            let mut pending = stream;
            loop {
                match tx.send_timeout(pending, DISPATCH_POLL) {
                    Ok(()) => break,
                    Err(SendTimeoutError::Timeout(stream)) => {
                        if self.shutdown.load(Ordering::Relaxed) {
                            return Ok(());
                        }
                        pending = stream;
                    }
                    Err(SendTimeoutError::Disconnected(_)) => {
                        return Err(SlogError::Network(
                            "All connection workers exited".to_string(),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn spawn_worker(&self, id: usize, rx: Receiver<TcpStream>) -> Result<thread::JoinHandle<()>> {
        let handler = Arc::clone(&self.handler);
        let shutdown = Arc::clone(&self.shutdown);
        let read_timeout_ms = self.config.read_timeout_ms;

        let handle = thread::Builder::new()
            .name(format!("slogd-worker-{}", id))
            .spawn(move || {
                for stream in rx.iter() {
                    let result = Connection::new(stream, Arc::clone(&handler), Arc::clone(&shutdown))
                        .and_then(|mut conn| {
                            conn.set_read_timeout(read_timeout_ms)?;
                            conn.handle()
                        });
                    if let Err(e) = result {
                        tracing::warn!("Connection closed with error: {}", e);
                    }
                }
            })?;
        Ok(handle)
    }
}
