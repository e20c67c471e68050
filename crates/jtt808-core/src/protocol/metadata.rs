//! Cheap routing peek: which protocol and which device, without a full decode.

use serde::{Deserialize, Serialize};

use crate::protocol::bcd;
use crate::protocol::error::ProtocolError;
use crate::protocol::frame::validate;
use crate::protocol::header::{DEVICE_ID_LEN, DEVICE_ID_OFFSET};
use crate::protocol::messages::PROTOCOL_ID;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMetadata {
    pub protocol_id: String,
    pub device_id: String,
}

/// Validates framing and checksum, then reads only the device id.
///
/// # Errors
///
/// Any framing, escape or checksum failure, or
/// [`ProtocolError::Truncated`] if the frame ends before the device id.
pub fn peek_metadata(raw: &[u8]) -> Result<FrameMetadata, ProtocolError> {
    let message = validate(raw)?;
    let end = DEVICE_ID_OFFSET + DEVICE_ID_LEN;
    let device = message.get(DEVICE_ID_OFFSET..end).ok_or(ProtocolError::Truncated {
        field: "device_id",
        needed: end,
        available: message.len(),
    })?;
    Ok(FrameMetadata {
        protocol_id: PROTOCOL_ID.to_string(),
        device_id: bcd::decode_digits(device),
    })
}
