//! TOML configuration for the inspector.
//!
//! Every field has a default, so a partial file (or none at all) is valid:
//!
//! ```toml
//! [codec]
//! max_buffered_bytes = 2097152
//! protocol_version = "china-jtt808-2013.1"
//!
//! [output]
//! log_level = "info"
//! pretty = false
//! emit_responses = true
//! chunk_size = 1024
//! ```
//!
//! Command-line flags override whatever the file sets.

use std::path::{Path, PathBuf};

use jtt808_core::CodecConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct InspectConfig {
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How decoded events are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Fallback `tracing` level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Pretty-print each JSON record instead of one per line.
    #[serde(default)]
    pub pretty: bool,
    /// Also write the acknowledgement the platform would send for each frame.
    #[serde(default)]
    pub emit_responses: bool,
    /// Bytes handed to the parser per simulated socket read.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_chunk_size() -> usize {
    1024
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            pretty: false,
            emit_responses: false,
            chunk_size: default_chunk_size(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl InspectConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed or a field has
    /// the wrong type.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Loads the config file at `path`.
///
/// Unlike the defaults-on-missing behaviour of an implicit config location,
/// a path given explicitly must exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if it is not valid TOML.
pub fn load_config(path: &Path) -> Result<InspectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    InspectConfig::from_toml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = InspectConfig::default();
        assert_eq!(cfg.output.log_level, "info");
        assert_eq!(cfg.output.chunk_size, 1024);
        assert!(!cfg.output.pretty);
        assert!(!cfg.output.emit_responses);
        assert_eq!(cfg.codec, CodecConfig::default());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(InspectConfig::from_toml_str("").unwrap(), InspectConfig::default());
    }

    #[test]
    fn test_partial_sections_fill_in() {
        let cfg = InspectConfig::from_toml_str(
            r#"
            [codec]
            max_buffered_bytes = 65536

            [output]
            emit_responses = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.codec.max_buffered_bytes, 65536);
        assert_eq!(cfg.codec.protocol_version, "china-jtt808-2013.1");
        assert!(cfg.output.emit_responses);
        assert_eq!(cfg.output.chunk_size, 1024);
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let err = InspectConfig::from_toml_str("[output]\nchunk_size = \"big\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/jtt808-inspect.toml")).unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("jtt808-inspect.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let mut cfg = InspectConfig::default();
        cfg.output.pretty = true;
        cfg.output.chunk_size = 7;
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(InspectConfig::from_toml_str(&text).unwrap(), cfg);
    }
}
