//! Network Module
//!
//! TCP listener, record framing and the handler boundary into storage.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Fixed worker pool, one connection per worker at a time
//! - Each worker frames 96 header bytes + 928 content bytes and hands them
//!   to a [`RecordHandler`]

mod client;
mod connection;
mod handler;
mod server;

pub use client::{send_test_logs, LogClient};
pub use connection::Connection;
pub use handler::LogServerHandler;
pub use server::{Server, ShutdownHandle};

use crate::error::Result;

/// Callbacks invoked by connection workers
///
/// `on_record` receives one fully reassembled record; partial records never
/// reach it. Returning an error closes the connection.
pub trait RecordHandler: Send + Sync + 'static {
    fn on_connected(&self, _peer: &str) {}

    fn on_disconnected(&self, _peer: &str) {}

    fn on_record(&self, header: &[u8], content: &[u8]) -> Result<()>;
}
