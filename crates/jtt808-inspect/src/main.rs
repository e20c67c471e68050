//! JT/T 808 capture inspector: entry point.
//!
//! # Usage
//!
//! ```text
//! jtt808-inspect [OPTIONS] <INPUT>
//!
//! Arguments:
//!   <INPUT>  Capture file, or `-` for standard input
//!
//! Options:
//!   --config <PATH>              TOML config file
//!   --format <auto|binary|hex>   How to read the capture [default: auto]
//!   --chunk-size <BYTES>         Bytes per simulated socket read
//!   --protocol <ID>              Parser version string
//!   --max-buffered-bytes <BYTES> Connection buffer discard threshold
//!   --pretty                     Pretty-print JSON records
//!   --responses                  Also print acknowledgement frames
//!   --log-level <LEVEL>          Fallback when RUST_LOG is unset
//! ```
//!
//! Flags override the config file; the file overrides built-in defaults.
//! Logs go to stderr so stdout stays machine-readable.
//!
//! | Variable                | Flag                   |
//! |-------------------------|------------------------|
//! | `JTT808_INSPECT_CONFIG` | `--config`             |
//! | `JTT808_CHUNK_SIZE`     | `--chunk-size`         |
//! | `JTT808_PROTOCOL`       | `--protocol`           |
//! | `JTT808_MAX_BUFFERED`   | `--max-buffered-bytes` |
//! | `JTT808_LOG_LEVEL`      | `--log-level`          |

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jtt808_inspect::app::{build_registry, run, select_parser};
use jtt808_inspect::capture::{decode_capture, read_input, CaptureFormat};
use jtt808_inspect::config::{load_config, InspectConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Replays a JT/T 808 capture through the codec and prints decoded events as
/// JSON lines.
#[derive(Debug, Parser)]
#[command(name = "jtt808-inspect", version)]
struct Cli {
    /// Capture file, or `-` for standard input.
    input: PathBuf,

    /// TOML config file with `[codec]` and `[output]` sections.
    #[arg(long, env = "JTT808_INSPECT_CONFIG")]
    config: Option<PathBuf>,

    /// How to read the capture.
    #[arg(long, value_enum, default_value_t = CaptureFormat::Auto)]
    format: CaptureFormat,

    /// Bytes handed to the parser per simulated socket read.
    #[arg(long, env = "JTT808_CHUNK_SIZE")]
    chunk_size: Option<usize>,

    /// Parser version string, e.g. `china-jtt808-2013.1`.
    #[arg(long, env = "JTT808_PROTOCOL")]
    protocol: Option<String>,

    /// Unread bytes beyond which the connection buffer is discarded.
    #[arg(long, env = "JTT808_MAX_BUFFERED")]
    max_buffered_bytes: Option<usize>,

    /// Pretty-print JSON records.
    #[arg(long)]
    pretty: bool,

    /// Also print the acknowledgement frame for every request.
    #[arg(long)]
    responses: bool,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, env = "JTT808_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    /// Loads the config file (if any) and layers the flags over it.
    fn into_config(&self) -> anyhow::Result<InspectConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path).with_context(|| format!("loading config {}", path.display()))?,
            None => InspectConfig::default(),
        };
        if let Some(chunk_size) = self.chunk_size {
            config.output.chunk_size = chunk_size;
        }
        if let Some(protocol) = &self.protocol {
            config.codec.protocol_version = protocol.clone();
        }
        if let Some(max) = self.max_buffered_bytes {
            config.codec.max_buffered_bytes = max;
        }
        if let Some(level) = &self.log_level {
            config.output.log_level = level.clone();
        }
        config.output.pretty |= self.pretty;
        config.output.emit_responses |= self.responses;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.into_config()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.output.log_level)),
        )
        .init();

    let parser = select_parser(&config.codec).with_context(|| {
        format!(
            "no parser for protocol '{}' (known: {})",
            config.codec.protocol_version,
            build_registry(&config.codec).protocols().join(", ")
        )
    })?;

    let content = read_input(&cli.input)?;
    let capture = decode_capture(&content, cli.format)
        .with_context(|| format!("reading capture {}", cli.input.display()))?;
    info!(
        protocol = parser.protocol_id(),
        bytes = capture.len(),
        chunk_size = config.output.chunk_size,
        "replaying capture"
    );

    let stdout = std::io::stdout();
    let summary = run(parser.as_ref(), &capture, &config.output, stdout.lock()).context("writing output")?;

    info!(
        frames = summary.frames,
        events = summary.events,
        failed = summary.failed,
        "capture replayed"
    );
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
