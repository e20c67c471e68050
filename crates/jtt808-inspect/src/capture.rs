//! Capture file loading.
//!
//! A capture is either the raw bytes read off a terminal connection or the
//! same bytes written as hex text. Hex captures may be split over lines,
//! spaced, and carry `#` comments:
//!
//! ```text
//! # heartbeat from 012345678901
//! 7E 00 02 00 00 01 23 45 67 89 01 00 01 23 7E
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("I/O error reading capture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid hex capture: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// How to interpret capture bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CaptureFormat {
    /// Hex if the file is entirely hex digits, whitespace and comments.
    #[default]
    Auto,
    Binary,
    Hex,
}

/// Reads `path`, or standard input when `path` is `-`.
pub fn read_input(path: &Path) -> Result<Vec<u8>, CaptureError> {
    let io_err = |source: std::io::Error| CaptureError::Io { path: path.to_path_buf(), source };
    if path == Path::new("-") {
        let mut data = Vec::new();
        std::io::stdin().read_to_end(&mut data).map_err(io_err)?;
        Ok(data)
    } else {
        std::fs::read(path).map_err(io_err)
    }
}

/// Turns file content into connection bytes.
pub fn decode_capture(content: &[u8], format: CaptureFormat) -> Result<Vec<u8>, CaptureError> {
    let as_hex = match format {
        CaptureFormat::Binary => false,
        CaptureFormat::Hex => true,
        CaptureFormat::Auto => looks_like_hex(content),
    };
    debug!(?format, as_hex, len = content.len(), "decoding capture");
    if !as_hex {
        return Ok(content.to_vec());
    }
    let text = String::from_utf8_lossy(content);
    Ok(hex::decode(strip_hex_text(&text))?)
}

fn strip_hex_text(text: &str) -> String {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .flat_map(str::split_whitespace)
        .collect()
}

fn looks_like_hex(content: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(content) else {
        return false;
    };
    let digits = strip_hex_text(text);
    !digits.is_empty() && digits.len() % 2 == 0 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_with_comments_and_spacing() {
        let text = b"# heartbeat\n7E 00 02\n00 00 # props\n  7e\n";
        let bytes = decode_capture(text, CaptureFormat::Hex).unwrap();
        assert_eq!(bytes, vec![0x7E, 0x00, 0x02, 0x00, 0x00, 0x7E]);
    }

    #[test]
    fn test_auto_detects_hex() {
        assert_eq!(decode_capture(b"7e7d02\n", CaptureFormat::Auto).unwrap(), vec![0x7E, 0x7D, 0x02]);
    }

    #[test]
    fn test_auto_keeps_binary() {
        let raw = [0x7E, 0x00, 0x02, 0xFF, 0x7E];
        assert_eq!(decode_capture(&raw, CaptureFormat::Auto).unwrap(), raw.to_vec());
    }

    #[test]
    fn test_binary_is_verbatim_even_if_hex_like() {
        assert_eq!(decode_capture(b"7e7e", CaptureFormat::Binary).unwrap(), b"7e7e".to_vec());
    }

    #[test]
    fn test_odd_hex_is_error() {
        let err = decode_capture(b"7e0", CaptureFormat::Hex).unwrap_err();
        assert!(matches!(err, CaptureError::Hex(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_input(Path::new("/nonexistent/capture.bin")).unwrap_err();
        assert!(matches!(err, CaptureError::Io { .. }));
    }
}
