//! Platform acknowledgements built from a terminal request.
//!
//! | request | reply  | body                                      |
//! |---------|--------|-------------------------------------------|
//! | 0x0100  | 0x8100 | `[ack_seq:2][result:1]([token])`          |
//! | other   | 0x8001 | `[ack_seq:2][ack_msg_id:2][result:1]`     |
//!
//! The reply reuses the request's device id and sequence number, keeps its
//! encryption bits and is never sub-packaged.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::protocol::builder::FrameBuilder;
use crate::protocol::frame::{validate, Frame};
use crate::protocol::header::{EncryptMode, DEVICE_ID_LEN, ENCRYPT_MASK};
use crate::protocol::messages::msg_id;
use crate::protocol::reader::BodyReader;

/// Outcome the platform reports back to the terminal.
///
/// Only [`ResponseReason::Ok`] maps to result code 0; every other reason is
/// sent as the generic failure code 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseReason {
    Ok,
    Failed,
    Invalid,
    Unsupported,
}

impl ResponseReason {
    pub fn result_code(self) -> u8 {
        match self {
            ResponseReason::Ok => 0,
            _ => 1,
        }
    }
}

/// Issues the authentication token sent in a successful registration reply.
pub trait TokenSource: Send + Sync {
    fn next_token(&self) -> String;
}

/// Random UUID v4 tokens in their 36-character hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokens;

impl TokenSource for UuidTokens {
    fn next_token(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<F> TokenSource for F
where
    F: Fn() -> String + Send + Sync,
{
    fn next_token(&self) -> String {
        self()
    }
}

/// Builds acknowledgement frames.
#[derive(Clone)]
pub struct ResponseEncoder {
    tokens: Arc<dyn TokenSource>,
}

impl fmt::Debug for ResponseEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseEncoder").finish_non_exhaustive()
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self::new(Arc::new(UuidTokens))
    }
}

impl ResponseEncoder {
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self { tokens }
    }

    /// Builds the reply to an already validated frame.
    pub fn respond(&self, request: &Frame, reason: ResponseReason) -> Option<Bytes> {
        self.build(request.message(), reason)
    }

    /// Validates a raw request frame (flags included) and builds its reply.
    ///
    /// Returns `None`, without error, when the request does not validate.
    pub fn respond_raw(&self, request: &[u8], reason: ResponseReason) -> Option<Bytes> {
        match validate(request) {
            Ok(message) => self.build(&message, reason),
            Err(err) => {
                debug!(%err, "no response for invalid request");
                None
            }
        }
    }

    fn build(&self, message: &[u8], reason: ResponseReason) -> Option<Bytes> {
        let mut r = BodyReader::new(message);
        let (request_id, props, device_id, sequence) = match (
            r.u16("msg_id"),
            r.u16("body_props"),
            r.array::<DEVICE_ID_LEN>("device_id"),
            r.u16("sequence_number"),
        ) {
            (Ok(id), Ok(props), Ok(device), Ok(seq)) => (id, props, device, seq),
            _ => {
                debug!(len = message.len(), "no response for truncated request header");
                return None;
            }
        };

        let encrypt_mode = EncryptMode::from_bits(((props & ENCRYPT_MASK) >> 10) as u8);
        let result = reason.result_code();

        let builder = match request_id {
            msg_id::REGISTER => {
                let builder = FrameBuilder::with_raw_device_id(msg_id::REGISTER_REPLY, device_id, sequence)
                    .put_u16(sequence)
                    .put_u8(result);
                if reason == ResponseReason::Ok {
                    builder.body(self.tokens.next_token().as_bytes())
                } else {
                    builder
                }
            }
            // Media uploads get the general acknowledgement, not a
            // retransmission request.
            msg_id::MEDIA_UPLOAD => general_ack(request_id, device_id, sequence, result),
            _ => general_ack(request_id, device_id, sequence, result),
        };

        match builder.encrypt_mode(encrypt_mode).finish() {
            Ok(wire) => Some(wire),
            Err(err) => {
                warn!(request = format_args!("0x{request_id:04X}"), %err, "cannot encode response");
                None
            }
        }
    }
}

fn general_ack(request_id: u16, device_id: [u8; DEVICE_ID_LEN], sequence: u16, result: u8) -> FrameBuilder {
    FrameBuilder::with_raw_device_id(msg_id::PLATFORM_ACK, device_id, sequence)
        .put_u16(sequence)
        .put_u16(request_id)
        .put_u8(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::escape::FLAG;
    use crate::protocol::header::SubPacket;

    fn fixed_tokens(token: &'static str) -> ResponseEncoder {
        ResponseEncoder::new(Arc::new(move || token.to_string()))
    }

    fn parse(wire: &Bytes) -> (crate::protocol::header::Header, Vec<u8>) {
        let frame = Frame::from_wire(wire.clone()).unwrap();
        let (header, body) = frame.header().unwrap();
        (header, body.to_vec())
    }

    #[test]
    fn test_register_success_carries_token() {
        let request = FrameBuilder::new(msg_id::REGISTER, "013912345678", 0x0102)
            .body(b"register body")
            .finish()
            .unwrap();
        let reply = fixed_tokens("TOKEN").respond_raw(&request, ResponseReason::Ok).unwrap();

        assert_eq!(reply[0], FLAG);
        assert_eq!(&reply[1..3], &[0x81, 0x00]);
        let (header, body) = parse(&reply);
        assert_eq!(header.msg_id, msg_id::REGISTER_REPLY);
        assert_eq!(header.device_id, "013912345678");
        assert_eq!(header.sequence_number, 0x0102);
        assert_eq!(header.body_length, 3 + 5);
        assert_eq!(body, [&[0x01, 0x02, 0x00][..], &b"TOKEN"[..]].concat());
    }

    #[test]
    fn test_register_failure_has_no_token() {
        let request = FrameBuilder::new(msg_id::REGISTER, "1", 7).finish().unwrap();
        let reply = fixed_tokens("TOKEN").respond_raw(&request, ResponseReason::Failed).unwrap();
        let (header, body) = parse(&reply);
        assert_eq!(header.body_length, 3);
        assert_eq!(body, vec![0x00, 0x07, 0x01]);
    }

    #[test]
    fn test_default_token_is_uuid() {
        let request = FrameBuilder::new(msg_id::REGISTER, "1", 1).finish().unwrap();
        let reply = ResponseEncoder::default().respond_raw(&request, ResponseReason::Ok).unwrap();
        let (_, body) = parse(&reply);
        let token = std::str::from_utf8(&body[3..]).unwrap();
        assert_eq!(token.len(), 36);
        assert!(Uuid::parse_str(token).is_ok());
    }

    #[test]
    fn test_general_ack_echoes_request() {
        let request = FrameBuilder::new(msg_id::POSITION_REPORT, "012345678901", 99)
            .body(&[0u8; 28])
            .finish()
            .unwrap();
        let reply = ResponseEncoder::default().respond_raw(&request, ResponseReason::Ok).unwrap();
        let (header, body) = parse(&reply);
        assert_eq!(header.msg_id, msg_id::PLATFORM_ACK);
        assert_eq!(header.sequence_number, 99);
        assert_eq!(header.body_length, 5);
        assert_eq!(body, vec![0x00, 99, 0x02, 0x00, 0x00]);
    }

    #[test]
    fn test_non_ok_reasons_collapse_to_failure() {
        let request = FrameBuilder::new(msg_id::HEARTBEAT, "1", 1).finish().unwrap();
        for reason in [ResponseReason::Failed, ResponseReason::Invalid, ResponseReason::Unsupported] {
            let reply = ResponseEncoder::default().respond_raw(&request, reason).unwrap();
            assert_eq!(parse(&reply).1[4], 1);
        }
    }

    #[test]
    fn test_media_upload_gets_general_ack() {
        let request = FrameBuilder::new(msg_id::MEDIA_UPLOAD, "1", 12)
            .sub_packet(SubPacket { total: 3, index: 3 })
            .body(&[0xFF, 0xD9])
            .finish()
            .unwrap();
        let reply = ResponseEncoder::default().respond_raw(&request, ResponseReason::Ok).unwrap();
        let (header, body) = parse(&reply);
        assert_eq!(header.msg_id, msg_id::PLATFORM_ACK);
        assert!(header.sub_packet.is_none());
        assert_eq!(body, vec![0x00, 12, 0x08, 0x01, 0x00]);
    }

    #[test]
    fn test_reply_keeps_encrypt_bits() {
        let request = FrameBuilder::new(msg_id::AUTHENTICATION, "1", 1)
            .encrypt_mode(EncryptMode::Rsa)
            .body(b"x")
            .finish()
            .unwrap();
        let reply = ResponseEncoder::default().respond_raw(&request, ResponseReason::Ok).unwrap();
        assert_eq!(parse(&reply).0.encrypt_mode, EncryptMode::Rsa);
    }

    #[test]
    fn test_invalid_request_gets_no_response() {
        let mut request = FrameBuilder::new(msg_id::HEARTBEAT, "1", 1).finish().unwrap().to_vec();
        let checksum_pos = request.len() - 2;
        request[checksum_pos] ^= 0x55;
        assert!(ResponseEncoder::default().respond_raw(&request, ResponseReason::Ok).is_none());
        assert!(ResponseEncoder::default().respond_raw(&[0x00, 0x01], ResponseReason::Ok).is_none());
    }

    #[test]
    fn test_oversized_token_gets_no_response() {
        let request = FrameBuilder::new(msg_id::REGISTER, "1", 1).finish().unwrap();
        let encoder = ResponseEncoder::new(Arc::new(|| "x".repeat(600)));
        assert!(encoder.respond_raw(&request, ResponseReason::Ok).is_none());
    }

    #[test]
    fn test_escaped_sequence_in_reply() {
        let request = FrameBuilder::new(msg_id::HEARTBEAT, "1", 0x7E7D).finish().unwrap();
        let reply = ResponseEncoder::default().respond_raw(&request, ResponseReason::Ok).unwrap();
        assert!(!reply[1..reply.len() - 1].contains(&FLAG));
        assert_eq!(parse(&reply).0.sequence_number, 0x7E7D);
    }
}
