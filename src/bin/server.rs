//! slogd Server Binary
//!
//! Starts the log server and reads console commands from stdin:
//! `test` (10 paced sample records), `hard` (102400 records), `exit`.

use std::io::BufRead;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use slogd::network::{send_test_logs, LogServerHandler, Server};
use slogd::{Config, LogPool};
use tracing_subscriber::{fmt, EnvFilter};

/// slogd Server
#[derive(Parser, Debug)]
#[command(name = "slogd-server")]
#[command(about = "Durable log ingestion server with memory-mapped segment storage")]
#[command(version)]
struct Args {
    /// Directory receiving segment files
    #[arg(short, long, default_value = "./slogd_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:13579")]
    listen: String,

    /// Records per segment file
    #[arg(short, long, default_value = "4096")]
    max_records: usize,

    /// Records between forced commits
    #[arg(short, long, default_value = "64")]
    commit_interval: usize,

    /// Connection worker threads
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Do not echo records to the console
    #[arg(long)]
    quiet: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slogd=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("slogd Server v{}", slogd::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_records(args.max_records)
        .commit_interval(args.commit_interval)
        .workers(args.workers)
        .echo(!args.quiet)
        .build();

    // The server refuses to start without its first segment
    let pool = match LogPool::open(&config) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            tracing::error!("Failed to open log pool: {}", e);
            std::process::exit(1);
        }
    };

    let handler = Arc::new(LogServerHandler::new(Arc::clone(&pool), config.echo));
    let server = match Server::bind(config, Arc::clone(&handler)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    let target = match server.local_addr() {
        Ok(addr) => loopback(addr),
        Err(e) => {
            tracing::error!("Failed to read listen address: {}", e);
            std::process::exit(1);
        }
    };
    let shutdown = server.shutdown_handle();

    let server_thread = thread::spawn(move || {
        if let Err(e) = server.run() {
            tracing::error!("Server error: {}", e);
        }
    });

    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        match line.trim() {
            "test" => spawn_load(target, 10, Duration::from_millis(200)),
            "hard" => spawn_load(target, 1024 * 10 * 10, Duration::ZERO),
            "exit" => break,
            "" => {}
            other => tracing::warn!("Unknown command: {}", other),
        }
    }

    shutdown.shutdown();
    if server_thread.join().is_err() {
        tracing::error!("Server thread panicked");
    }

    tracing::info!(
        "Accepted {} records, dropped {}",
        handler.accepted(),
        handler.dropped()
    );
    drop(handler);

    if let Ok(pool) = Arc::try_unwrap(pool) {
        if let Err(e) = pool.close() {
            tracing::error!("Final flush failed: {}", e);
        }
    }
}

/// Connect to a wildcard listener through loopback
fn loopback(addr: SocketAddr) -> SocketAddr {
    if addr.ip().is_unspecified() {
        SocketAddr::from(([127, 0, 0, 1], addr.port()))
    } else {
        addr
    }
}

fn spawn_load(target: SocketAddr, count: usize, interval: Duration) {
    thread::spawn(move || match send_test_logs(target, count, interval) {
        Ok(sent) => tracing::info!("Sent {} test records", sent),
        Err(e) => tracing::error!("Test client failed: {}", e),
    });
}
