//! slogd Load Client
//!
//! Sends synthetic records to a running server.

use std::time::Duration;

use clap::Parser;
use slogd::network::send_test_logs;
use tracing_subscriber::{fmt, EnvFilter};

/// slogd load client
#[derive(Parser, Debug)]
#[command(name = "slogd-client")]
#[command(about = "Synthetic load generator for slogd")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:13579")]
    server: String,

    /// Number of records to send
    #[arg(short, long, default_value = "10")]
    count: usize,

    /// Pause between records (milliseconds)
    #[arg(short, long, default_value = "200")]
    interval_ms: u64,

    /// Send 102400 records with no pause
    #[arg(long)]
    hard: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let (count, interval) = if args.hard {
        (1024 * 10 * 10, Duration::ZERO)
    } else {
        (args.count, Duration::from_millis(args.interval_ms))
    };

    match send_test_logs(&args.server, count, interval) {
        Ok(sent) => tracing::info!("Sent {} records to {}", sent, args.server),
        Err(e) => {
            tracing::error!("Failed: {}", e);
            std::process::exit(1);
        }
    }
}
