//! Single-byte XOR checksum over the logical header and body.

use crate::protocol::error::ProtocolError;

/// XOR of every byte in `bytes`.
pub fn xor(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

/// Splits unescaped frame content into `(header + body)` after checking the
/// last byte against the XOR of everything before it.
///
/// # Errors
///
/// [`ProtocolError::FrameTooShort`] when there is no checksum byte, and
/// [`ProtocolError::ChecksumMismatch`] when the checksum does not match.
pub fn verify(content: &[u8]) -> Result<&[u8], ProtocolError> {
    let Some((&expected, message)) = content.split_last() else {
        return Err(ProtocolError::FrameTooShort(0));
    };
    let computed = xor(message);
    if computed != expected {
        return Err(ProtocolError::ChecksumMismatch { expected, computed });
    }
    Ok(message)
}
