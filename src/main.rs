use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use droid_drive_runtime::config::{ControllerConfig, BRIDGE_PORT};
use droid_drive_runtime::runtime::{self, Link, RunOptions};
use droid_drive_runtime::transport::DEFAULT_BAUDRATE;

/// Drive a droid from zenoh intents
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Link carrying payloads to the droid
    #[arg(long, value_enum, default_value_t = Link::Zenoh)]
    link: Link,

    /// Serial port of the BLE bridge (serial link only)
    #[arg(long, default_value = BRIDGE_PORT)]
    port: String,

    #[arg(long, default_value_t = DEFAULT_BAUDRATE)]
    baud: u32,

    /// JSON controller config (default speed/ramp, overflow policy)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init(); // installs the subscriber globally

    let args = Args::parse();

    let controller = match &args.config {
        Some(path) => match ControllerConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => ControllerConfig::default(),
    };

    let options = RunOptions {
        link: args.link,
        port: args.port,
        baud: args.baud,
        controller,
    };

    if let Err(e) = runtime::run(options).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
