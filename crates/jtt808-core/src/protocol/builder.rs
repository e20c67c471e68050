//! Append-only frame construction.
//!
//! A [`FrameBuilder`] collects the header fields and body, then
//! [`FrameBuilder::finish`] assembles the logical message and runs the single
//! finalize step: checksum, escape, flag-wrap.

use bytes::{BufMut, Bytes};

use crate::protocol::bcd;
use crate::protocol::checksum;
use crate::protocol::error::ProtocolError;
use crate::protocol::escape::{escape_into, FLAG};
use crate::protocol::header::{
    EncryptMode, SubPacket, BASE_HEADER_SIZE, BODY_LENGTH_MASK, DEVICE_ID_LEN, SUB_PACKAGED_BIT,
    SUB_PACKAGED_HEADER_SIZE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum DeviceId {
    Digits(String),
    Raw([u8; DEVICE_ID_LEN]),
}

/// Builds one wire frame.
///
/// ```rust
/// use jtt808_core::protocol::builder::FrameBuilder;
///
/// let wire = FrameBuilder::new(0x0002, "012345678901", 1).finish().unwrap();
/// assert_eq!(wire.first(), Some(&0x7E));
/// assert_eq!(wire.last(), Some(&0x7E));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuilder {
    msg_id: u16,
    device_id: DeviceId,
    sequence_number: u16,
    encrypt_mode: EncryptMode,
    sub_packet: Option<SubPacket>,
    body: Vec<u8>,
}

impl FrameBuilder {
    /// Starts a frame for a device id given as up to 12 decimal digits
    /// (left-padded with zeros).
    pub fn new(msg_id: u16, device_id: impl Into<String>, sequence_number: u16) -> Self {
        Self::with_device(msg_id, DeviceId::Digits(device_id.into()), sequence_number)
    }

    /// Starts a frame for a device id already in its 6-byte BCD form.
    pub fn with_raw_device_id(msg_id: u16, device_id: [u8; DEVICE_ID_LEN], sequence_number: u16) -> Self {
        Self::with_device(msg_id, DeviceId::Raw(device_id), sequence_number)
    }

    fn with_device(msg_id: u16, device_id: DeviceId, sequence_number: u16) -> Self {
        Self {
            msg_id,
            device_id,
            sequence_number,
            encrypt_mode: EncryptMode::Plain,
            sub_packet: None,
            body: Vec::new(),
        }
    }

    pub fn encrypt_mode(mut self, mode: EncryptMode) -> Self {
        self.encrypt_mode = mode;
        self
    }

    /// Marks the frame as one packet of a sub-packaged message.
    pub fn sub_packet(mut self, sub_packet: SubPacket) -> Self {
        self.sub_packet = Some(sub_packet);
        self
    }

    /// Appends raw body bytes.
    pub fn body(mut self, bytes: &[u8]) -> Self {
        self.body.put_slice(bytes);
        self
    }

    pub fn put_u8(mut self, value: u8) -> Self {
        self.body.put_u8(value);
        self
    }

    pub fn put_u16(mut self, value: u16) -> Self {
        self.body.put_u16(value);
        self
    }

    pub fn put_u32(mut self, value: u32) -> Self {
        self.body.put_u32(value);
        self
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Assembles, checksums, escapes and flag-wraps the frame.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::BodyTooLong`] when the body does not fit the 9-bit
    /// length field and [`ProtocolError::InvalidDeviceId`] for a device id
    /// that is not decimal or longer than 12 digits.
    pub fn finish(self) -> Result<Bytes, ProtocolError> {
        let body_len = self.body.len();
        if body_len > usize::from(BODY_LENGTH_MASK) {
            return Err(ProtocolError::BodyTooLong(body_len));
        }

        let device_id = match self.device_id {
            DeviceId::Raw(raw) => raw.to_vec(),
            DeviceId::Digits(digits) => {
                bcd::encode_digits(&digits, DEVICE_ID_LEN).ok_or(ProtocolError::InvalidDeviceId(digits))?
            }
        };

        let mut props = (u16::from(self.encrypt_mode.bits()) << 10) | body_len as u16;
        let header_len = if self.sub_packet.is_some() {
            props |= SUB_PACKAGED_BIT;
            SUB_PACKAGED_HEADER_SIZE
        } else {
            BASE_HEADER_SIZE
        };

        let mut message = Vec::with_capacity(header_len + body_len + 1);
        message.put_u16(self.msg_id);
        message.put_u16(props);
        message.put_slice(&device_id);
        message.put_u16(self.sequence_number);
        if let Some(packet) = self.sub_packet {
            message.put_u16(packet.total);
            message.put_u16(packet.index);
        }
        message.put_slice(&self.body);
        message.put_u8(checksum::xor(&message));

        let mut wire = Vec::with_capacity(message.len() + message.len() / 8 + 2);
        wire.put_u8(FLAG);
        escape_into(&message, &mut wire);
        wire.put_u8(FLAG);
        Ok(Bytes::from(wire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::Frame;

    #[test]
    fn test_heartbeat_bytes() {
        let wire = FrameBuilder::new(0x0002, "012345678901", 1).finish().unwrap();
        let header = [0x00, 0x02, 0x00, 0x00, 0x01, 0x23, 0x45, 0x67, 0x89, 0x01, 0x00, 0x01];
        let mut expected = vec![FLAG];
        expected.extend_from_slice(&header);
        expected.push(checksum::xor(&header));
        expected.push(FLAG);
        assert_eq!(wire.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_built_frame_parses_back() {
        let wire = FrameBuilder::new(0x0801, "13912345678", 300)
            .encrypt_mode(EncryptMode::Rsa)
            .sub_packet(SubPacket { total: 4, index: 2 })
            .put_u32(0x7E7D_0000)
            .body(&[0x7E])
            .finish()
            .unwrap();
        let frame = Frame::from_wire(wire).unwrap();
        let (header, body) = frame.header().unwrap();
        assert_eq!(header.msg_id, 0x0801);
        assert_eq!(header.device_id, "013912345678");
        assert_eq!(header.sequence_number, 300);
        assert_eq!(header.encrypt_mode, EncryptMode::Rsa);
        assert_eq!(header.sub_packet, Some(SubPacket { total: 4, index: 2 }));
        assert_eq!(body, &[0x7E, 0x7D, 0x00, 0x00, 0x7E]);
    }

    #[test]
    fn test_body_bytes_are_escaped() {
        let wire = FrameBuilder::new(0x0102, "1", 0x7E7D).body(&[0x7E, 0x7D]).finish().unwrap();
        let inner = &wire[1..wire.len() - 1];
        assert!(!inner.contains(&FLAG));
    }

    #[test]
    fn test_body_at_limit_is_accepted() {
        let wire = FrameBuilder::new(0x0900, "1", 0).body(&[0u8; 511]).finish();
        assert!(wire.is_ok());
    }

    #[test]
    fn test_body_over_limit_is_rejected() {
        let result = FrameBuilder::new(0x0900, "1", 0).body(&[0u8; 512]).finish();
        assert_eq!(result, Err(ProtocolError::BodyTooLong(512)));
    }

    #[test]
    fn test_invalid_device_id_is_rejected() {
        let result = FrameBuilder::new(0x0002, "12AB", 0).finish();
        assert_eq!(result, Err(ProtocolError::InvalidDeviceId("12AB".into())));
        let result = FrameBuilder::new(0x0002, "1234567890123", 0).finish();
        assert!(matches!(result, Err(ProtocolError::InvalidDeviceId(_))));
    }

    #[test]
    fn test_raw_device_id_is_copied() {
        let wire = FrameBuilder::with_raw_device_id(0x0002, [0xAB, 0, 0, 0, 0, 0x01], 1).finish().unwrap();
        let frame = Frame::from_wire(wire).unwrap();
        assert_eq!(frame.header().unwrap().0.device_id, "AB0000000001");
    }
}
