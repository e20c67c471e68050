//! Byte-stuffing transform applied between the 0x7E flags.
//!
//! ```text
//! logical  0x7D  ->  wire 0x7D 0x01
//! logical  0x7E  ->  wire 0x7D 0x02
//! ```

use crate::protocol::error::ProtocolError;

/// Frame delimiter.
pub const FLAG: u8 = 0x7E;

/// Escape introducer.
pub const ESCAPE: u8 = 0x7D;

/// Restores the logical bytes of a wire span that excludes both flags.
///
/// `0x7D` followed by anything other than `0x01`/`0x02` is copied through
/// unchanged. A `0x7D` in the last position has nothing to pair with and is
/// rejected.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidEscape`] for a trailing lone `0x7D`.
pub fn unescape(wire: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let mut out = Vec::with_capacity(wire.len());
    let mut i = 0;
    while i < wire.len() {
        let byte = wire[i];
        if byte == ESCAPE {
            match wire.get(i + 1) {
                Some(0x01) => {
                    out.push(ESCAPE);
                    i += 2;
                    continue;
                }
                Some(0x02) => {
                    out.push(FLAG);
                    i += 2;
                    continue;
                }
                Some(_) => {}
                None => return Err(ProtocolError::InvalidEscape(i)),
            }
        }
        out.push(byte);
        i += 1;
    }
    Ok(out)
}

/// Stuffs a fully built message (header, body and checksum) for the wire.
pub fn escape(logical: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(logical.len() + logical.len() / 8 + 2);
    escape_into(logical, &mut out);
    out
}

/// Appends the stuffed form of `logical` to `out`.
pub fn escape_into(logical: &[u8], out: &mut Vec<u8>) {
    for &byte in logical {
        match byte {
            ESCAPE => out.extend_from_slice(&[ESCAPE, 0x01]),
            FLAG => out.extend_from_slice(&[ESCAPE, 0x02]),
            other => out.push(other),
        }
    }
}
