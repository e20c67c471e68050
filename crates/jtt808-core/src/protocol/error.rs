//! Error type shared by every stage of the codec.

use thiserror::Error;

/// Errors that can occur while validating, decoding or encoding a frame.
///
/// None of these ever escape a batch: the extractor drops invalid frames and
/// the parser aborts only the frame that failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A field needed more bytes than the frame (or declared body) carries.
    #[error("truncated {field}: need {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// The body length in the header does not match the bytes in the frame.
    #[error("body length mismatch: header declares {declared}, frame carries {available}")]
    BodyLengthMismatch { declared: usize, available: usize },

    /// The content ended with a lone escape byte (0x7D).
    #[error("dangling escape byte at offset {0}")]
    InvalidEscape(usize),

    /// The trailing checksum byte does not match the computed XOR.
    #[error("checksum mismatch: frame carries 0x{expected:02X}, computed 0x{computed:02X}")]
    ChecksumMismatch { expected: u8, computed: u8 },

    /// The span between the flags is too short to hold a checksum.
    #[error("frame too short: {0} bytes between flags")]
    FrameTooShort(usize),

    /// The span does not start and end with the 0x7E flag.
    #[error("frame is not delimited by 0x7E flags")]
    MissingFlag,

    /// A body being encoded does not fit the 9-bit length field.
    #[error("body too long: {0} bytes exceeds the 511-byte length field")]
    BodyTooLong(usize),

    /// A device id being encoded is not at most 12 decimal digits.
    #[error("invalid device id {0:?}")]
    InvalidDeviceId(String),
}
