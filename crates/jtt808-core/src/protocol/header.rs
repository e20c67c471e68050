//! Message header decoding.
//!
//! ```text
//! [msg_id:2][body_props:2][device_id:6 BCD][sequence:2]([packet_total:2][packet_index:2])
//! ```
//!
//! `body_props` packs the body length (bits 0-8), the encryption mode
//! (bits 10-12) and the sub-package flag (bit 13).

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::protocol::error::ProtocolError;
use crate::protocol::reader::BodyReader;

/// Header size without the sub-package fields.
pub const BASE_HEADER_SIZE: usize = 12;

/// Header size with the sub-package fields.
pub const SUB_PACKAGED_HEADER_SIZE: usize = 16;

/// Mask for the 9-bit body length.
pub const BODY_LENGTH_MASK: u16 = 0x01FF;

/// Mask for the encryption mode bits.
pub const ENCRYPT_MASK: u16 = 0x1C00;

/// Sub-package flag.
pub const SUB_PACKAGED_BIT: u16 = 0x2000;

/// Offset of the BCD device id within the logical header.
pub const DEVICE_ID_OFFSET: usize = 4;

/// Width of the BCD device id.
pub const DEVICE_ID_LEN: usize = 6;

/// Body encryption indicated by bits 10-12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptMode {
    Plain,
    Rsa,
    /// A reserved combination, carried through untouched.
    Reserved(u8),
}

impl EncryptMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => EncryptMode::Plain,
            1 => EncryptMode::Rsa,
            other => EncryptMode::Reserved(other),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            EncryptMode::Plain => 0,
            EncryptMode::Rsa => 1,
            EncryptMode::Reserved(b) => b & 0x07,
        }
    }

    pub fn is_encrypted(self) -> bool {
        self != EncryptMode::Plain
    }
}

/// Position of a frame within a sub-packaged message. `index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubPacket {
    pub total: u16,
    pub index: u16,
}

impl SubPacket {
    pub fn is_first(&self) -> bool {
        self.index <= 1
    }

    pub fn is_last(&self) -> bool {
        self.index >= self.total
    }
}

/// Decoded message header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub msg_id: u16,
    /// The raw `body_props` word.
    pub body_props: u16,
    pub body_length: usize,
    pub encrypt_mode: EncryptMode,
    /// Terminal phone number, always 12 digits.
    pub device_id: String,
    pub sequence_number: u16,
    pub sub_packet: Option<SubPacket>,
}

impl Header {
    pub fn is_sub_packaged(&self) -> bool {
        self.sub_packet.is_some()
    }

    /// Bytes occupied by this header on the logical (unescaped) frame.
    pub fn encoded_len(&self) -> usize {
        if self.is_sub_packaged() {
            SUB_PACKAGED_HEADER_SIZE
        } else {
            BASE_HEADER_SIZE
        }
    }
}

/// Decodes the header at the start of `message` (unescaped, without the
/// checksum) and returns it with the body slice that follows.
///
/// # Errors
///
/// [`ProtocolError::Truncated`] if the header is cut short and
/// [`ProtocolError::BodyLengthMismatch`] if the declared body length differs
/// from the bytes that follow the header.
pub fn parse_header(message: &[u8]) -> Result<(Header, &[u8]), ProtocolError> {
    let mut r = BodyReader::new(message);
    let msg_id = r.u16("msg_id")?;
    let body_props = r.u16("body_props")?;
    let device_id = r.bcd(DEVICE_ID_LEN, "device_id")?;
    let sequence_number = r.u16("sequence_number")?;

    let sub_packet = if body_props & SUB_PACKAGED_BIT != 0 {
        let total = r.u16("sub_packet_total")?;
        let index = r.u16("sub_packet_index")?;
        Some(SubPacket { total, index })
    } else {
        None
    };

    let body_length = usize::from(body_props & BODY_LENGTH_MASK);
    let body = r.rest();
    if body.len() != body_length {
        return Err(ProtocolError::BodyLengthMismatch {
            declared: body_length,
            available: body.len(),
        });
    }

    let encrypt_mode = EncryptMode::from_bits(((body_props & ENCRYPT_MASK) >> 10) as u8);
    trace!(
        msg_id = format_args!("0x{msg_id:04X}"),
        body_length,
        ?encrypt_mode,
        ?sub_packet,
        %device_id,
        sequence_number,
        "parsed header"
    );

    Ok((
        Header {
            msg_id,
            body_props,
            body_length,
            encrypt_mode,
            device_id,
            sequence_number,
            sub_packet,
        },
        body,
    ))
}
