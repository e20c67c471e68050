//! Codec configuration.
//!
//! Embedded in the configuration of whatever hosts the codec; every field
//! has a default so an empty table is valid:
//!
//! ```toml
//! [codec]
//! max_buffered_bytes = 2097152
//! protocol_version = "china-jtt808-2013.1"
//! ```

use serde::{Deserialize, Serialize};

use crate::protocol::frame::MAX_BUFFERED_BYTES;
use crate::protocol::messages::PROTOCOL_ID;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodecConfig {
    /// Unread bytes beyond which a connection buffer is discarded.
    #[serde(default = "default_max_buffered_bytes")]
    pub max_buffered_bytes: usize,
    /// Registry key of the parser to use.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
}

fn default_max_buffered_bytes() -> usize {
    MAX_BUFFERED_BYTES
}
fn default_protocol_version() -> String {
    PROTOCOL_ID.to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_buffered_bytes: default_max_buffered_bytes(),
            protocol_version: default_protocol_version(),
        }
    }
}
