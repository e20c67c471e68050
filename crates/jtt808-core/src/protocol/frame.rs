//! Flag-delimited frames and their extraction from a connection buffer.
//!
//! Wire format:
//! ```text
//! 0x7E | header | body | checksum:1 | 0x7E      (header..checksum byte-stuffed)
//! ```

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, warn};

use crate::protocol::checksum;
use crate::protocol::error::ProtocolError;
use crate::protocol::escape::{unescape, FLAG};
use crate::protocol::header::{parse_header, Header};

/// Buffered bytes beyond which the whole buffer is discarded: 2 MiB.
pub const MAX_BUFFERED_BYTES: usize = 2 * 1024 * 1024;

/// One checksum-verified frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The frame as received, flags included.
    raw: Bytes,
    /// Unescaped header and body, checksum stripped.
    message: Bytes,
}

impl Frame {
    /// Validates a complete wire frame (flags included).
    ///
    /// # Errors
    ///
    /// [`ProtocolError::MissingFlag`] if the span is not flag-delimited, and
    /// any unescape or checksum failure.
    pub fn from_wire(raw: impl Into<Bytes>) -> Result<Self, ProtocolError> {
        let raw = raw.into();
        let message = validate(&raw)?;
        Ok(Self {
            raw,
            message: Bytes::from(message),
        })
    }

    /// The frame as received, flags included.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Unescaped header and body without the checksum.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Message id, if the frame is long enough to carry one.
    pub fn msg_id(&self) -> Option<u16> {
        match self.message.get(..2) {
            Some(&[hi, lo]) => Some(u16::from_be_bytes([hi, lo])),
            _ => None,
        }
    }

    /// Decodes the header and returns it with the body slice.
    pub fn header(&self) -> Result<(Header, &[u8]), ProtocolError> {
        parse_header(&self.message)
    }
}

/// Unescapes and checksum-verifies a flag-delimited span, returning the
/// logical header and body.
pub(crate) fn validate(raw: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    if raw.len() < 2 || raw[0] != FLAG || raw[raw.len() - 1] != FLAG {
        return Err(ProtocolError::MissingFlag);
    }
    let mut content = unescape(&raw[1..raw.len() - 1])?;
    let message_len = checksum::verify(&content)?.len();
    content.truncate(message_len);
    Ok(content)
}

/// Scans a connection buffer for frames.
///
/// The extractor owns no buffer of its own: the caller keeps one
/// [`BytesMut`] per connection, appends whatever the transport delivered and
/// calls [`FrameExtractor::extract`]. Consumed bytes are removed from the
/// front; an unterminated frame is left in place for the next call.
#[derive(Debug, Clone, Copy)]
pub struct FrameExtractor {
    max_buffered_bytes: usize,
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new(MAX_BUFFERED_BYTES)
    }
}

impl FrameExtractor {
    pub fn new(max_buffered_bytes: usize) -> Self {
        Self { max_buffered_bytes }
    }

    pub fn max_buffered_bytes(&self) -> usize {
        self.max_buffered_bytes
    }

    /// Pulls every complete, valid frame out of `buf`.
    ///
    /// - Bytes before an opening flag are skipped one by one.
    /// - A span whose checksum or escaping is broken is dropped. Its closing
    ///   flag stays in the buffer so it can open the next frame.
    /// - An opening flag without a closing one stops the scan; the partial
    ///   frame is kept.
    /// - More than `max_buffered_bytes` unread bytes clears the buffer first.
    pub fn extract(&self, buf: &mut BytesMut) -> Vec<Frame> {
        let mut frames = Vec::new();

        if buf.len() > self.max_buffered_bytes {
            warn!(
                buffered = buf.len(),
                limit = self.max_buffered_bytes,
                "discarding oversized connection buffer"
            );
            buf.clear();
            return frames;
        }

        loop {
            match buf.iter().position(|&b| b == FLAG) {
                Some(start) => buf.advance(start),
                None => {
                    let len = buf.len();
                    buf.advance(len);
                    break;
                }
            }

            // buf[0] is an opening flag
            let Some(end) = buf[1..].iter().position(|&b| b == FLAG).map(|p| p + 1) else {
                break;
            };

            match validate(&buf[..=end]) {
                Ok(message) => {
                    let raw = buf.split_to(end + 1).freeze();
                    frames.push(Frame {
                        raw,
                        message: Bytes::from(message),
                    });
                }
                Err(err) => {
                    debug!(span_len = end + 1, %err, "dropping invalid frame");
                    buf.advance(end);
                }
            }
        }

        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::escape::escape;

    /// Heartbeat from device 012345678901, sequence 1.
    fn heartbeat() -> Vec<u8> {
        let message = [0x00, 0x02, 0x00, 0x00, 0x01, 0x23, 0x45, 0x67, 0x89, 0x01, 0x00, 0x01];
        let mut content = message.to_vec();
        content.push(checksum::xor(&message));
        let mut wire = vec![FLAG];
        wire.extend(escape(&content));
        wire.push(FLAG);
        wire
    }

    #[test]
    fn test_extract_single_frame() {
        let mut buf = BytesMut::from(&heartbeat()[..]);
        let frames = FrameExtractor::default().extract(&mut buf);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].msg_id(), Some(0x0002));
        assert_eq!(frames[0].raw().as_ref(), heartbeat().as_slice());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_buffer_without_flag_is_consumed() {
        let mut buf = BytesMut::from(&[0x01u8, 0x02, 0x03, 0x04, 0x05][..]);
        let frames = FrameExtractor::default().extract(&mut buf);
        assert!(frames.is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_leading_garbage_is_skipped() {
        let mut data = vec![0x11, 0x22, 0x33];
        data.extend(heartbeat());
        let mut buf = BytesMut::from(&data[..]);
        assert_eq!(FrameExtractor::default().extract(&mut buf).len(), 1);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_partial_frame_is_retained() {
        let full = heartbeat();
        let mut buf = BytesMut::from(&full[..full.len() - 1]);
        let extractor = FrameExtractor::default();

        assert!(extractor.extract(&mut buf).is_empty());
        assert_eq!(buf.len(), full.len() - 1);

        buf.extend_from_slice(&full[full.len() - 1..]);
        assert_eq!(extractor.extract(&mut buf).len(), 1);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_corrupted_frame_is_dropped_and_next_recovered() {
        let mut bad = heartbeat();
        let checksum_pos = bad.len() - 2;
        bad[checksum_pos] ^= 0xFF;
        let mut data = bad;
        data.extend(heartbeat());

        let mut buf = BytesMut::from(&data[..]);
        let frames = FrameExtractor::default().extract(&mut buf);
        assert_eq!(frames.len(), 1);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_unterminated_fragment_shares_flag_with_next_frame() {
        // A fragment whose closing flag was lost; the next frame's opening
        // flag closes the fragment and then opens the good frame.
        let mut data = vec![FLAG, 0x01, 0x02, 0x04];
        data.extend(heartbeat());

        let mut buf = BytesMut::from(&data[..]);
        let frames = FrameExtractor::default().extract(&mut buf);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].msg_id(), Some(0x0002));
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut data = heartbeat();
        data.extend(heartbeat());
        data.extend(heartbeat());
        let mut buf = BytesMut::from(&data[..]);
        assert_eq!(FrameExtractor::default().extract(&mut buf).len(), 3);
    }

    #[test]
    fn test_oversized_buffer_is_cleared() {
        let mut buf = BytesMut::from(&vec![0x7Eu8; 3 * 1024 * 1024][..]);
        let frames = FrameExtractor::default().extract(&mut buf);
        assert!(frames.is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_custom_limit() {
        let mut data = heartbeat();
        data.extend(heartbeat());
        let mut buf = BytesMut::from(&data[..]);
        let frames = FrameExtractor::new(16).extract(&mut buf);
        assert!(frames.is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_span_between_flags_is_dropped() {
        let mut data = vec![FLAG];
        data.extend(heartbeat());
        let mut buf = BytesMut::from(&data[..]);
        assert_eq!(FrameExtractor::default().extract(&mut buf).len(), 1);
    }

    #[test]
    fn test_from_wire_rejects_missing_flags() {
        assert_eq!(Frame::from_wire(vec![0x00, 0x01]), Err(ProtocolError::MissingFlag));
        assert_eq!(Frame::from_wire(vec![FLAG]), Err(ProtocolError::MissingFlag));
    }

    #[test]
    fn test_from_wire_exposes_unescaped_message() {
        let frame = Frame::from_wire(heartbeat()).unwrap();
        assert_eq!(frame.message().len(), 12);
        let (header, body) = frame.header().unwrap();
        assert_eq!(header.device_id, "012345678901");
        assert!(body.is_empty());
    }
}
