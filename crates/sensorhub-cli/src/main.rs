//! sensorhub - replay hub UART traffic and report occupancy changes
//!
//! Reads raw hub bytes from a capture file or stdin, runs them through the
//! frame reader, decoder and dispatcher configured in a TOML file, and
//! prints every state change as a JSON line on stdout. Logs go to stderr.
//!
//! ```sh
//! sensorhub --config hub.toml --input capture.bin
//! cat /dev/ttyUSB0 | RUST_LOG=debug sensorhub --config hub.toml
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use sensorhub_hub::{HoldTimer, HubConfig, HubContext, ReadSource, StateChange, StateObserver};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Replay hub UART traffic and report occupancy changes
#[derive(Parser, Debug)]
#[command(name = "sensorhub", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Byte capture to read instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Print the parsed configuration and exit
    #[arg(long)]
    dump_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = HubConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    if args.dump_config {
        let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
        println!("{rendered}");
        return Ok(());
    }

    let registry = config
        .build_registry()
        .context("Failed to register devices")?;
    let hub = HubContext::new(config.build_reader(), registry, print_change);

    info!(
        "sensorhub {} listening for {} frames",
        env!("CARGO_PKG_VERSION"),
        hub.format()
    );

    let hub = match config.hold_timer() {
        None => {
            let input = open_input(args.input.as_deref())?;
            tokio::task::spawn_blocking(move || replay(hub, input))
                .await
                .context("Replay task panicked")??
        }
        Some(hold) => {
            info!("Auto-clear after {} ms", hold.hold().as_millis());
            let input = open_async_input(args.input.as_deref()).await?;
            replay_with_hold(hub, hold, input).await?
        }
    };

    for handle in hub.registry() {
        info!("{}", handle);
    }

    let stats = serde_json::to_string(&hub.stats()).context("Failed to render statistics")?;
    info!("Final statistics: {}", stats);

    Ok(())
}

/// Observer printing each state change as one JSON line.
fn print_change(change: &StateChange) {
    match serde_json::to_string(change) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!("Failed to render {}: {}", change, e),
    }
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read + Send>> {
    Ok(match path {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(std::io::stdin()),
    })
}

async fn open_async_input(path: Option<&Path>) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
    Ok(match path {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    })
}

/// Drain `input` through the hub on a blocking thread.
fn replay<O: StateObserver>(
    mut hub: HubContext<O>,
    input: Box<dyn Read + Send>,
) -> Result<HubContext<O>> {
    let mut source = ReadSource::new(input);
    let consumed = hub.run(&mut source);
    info!("End of input after {} bytes", consumed);

    match source.into_error() {
        Some(e) => Err(e).context("Failed to read input"),
        None => Ok(hub),
    }
}

/// Feed `input` through the hub while expiring held sensors on time.
async fn replay_with_hold<O: StateObserver>(
    mut hub: HubContext<O>,
    mut hold: HoldTimer,
    mut input: Box<dyn AsyncRead + Send + Unpin>,
) -> Result<HubContext<O>> {
    let consumed = hub
        .run_with_hold(&mut input, &mut hold)
        .await
        .context("Failed to read input")?;

    info!("End of input after {} bytes", consumed);
    if hold.pending() > 0 {
        info!("{} sensor(s) still held at end of input", hold.pending());
    }

    Ok(hub)
}
