//! # jtt808-inspect
//!
//! Replays a JT/T 808 capture through the codec: the bytes are fed in
//! socket-sized chunks to the parser selected from a [`ParserRegistry`],
//! decoded events are printed as JSON records, and optionally so are the
//! acknowledgements the platform would send back.
//!
//! - **`capture`** – binary or hex capture loading.
//! - **`config`** – TOML settings, overridden by command-line flags.
//! - **`app`** – the chunked read/extract/decode loop and JSON output.
//!
//! [`ParserRegistry`]: jtt808_core::ParserRegistry

pub mod app;
pub mod capture;
pub mod config;

pub use app::{run, JsonLines, OutputRecord};
pub use capture::{decode_capture, read_input, CaptureError, CaptureFormat};
pub use config::{load_config, ConfigError, InspectConfig, OutputConfig};
