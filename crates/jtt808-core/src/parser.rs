//! The parser seam: what a transport needs from a protocol implementation.
//!
//! A transport owns one [`BytesMut`] per connection. After each read it
//! calls [`DataParser::process`] (or [`DataParser::extract`] and
//! [`DataParser::decode`] separately) and hands the resulting events to an
//! [`EventSink`]. Replies come from [`DataParser::create_response`].

use std::ops::AddAssign;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::CodecConfig;
use crate::protocol::codec::{BodyDecoder, DecodedFrame};
use crate::protocol::error::ProtocolError;
use crate::protocol::frame::{Frame, FrameExtractor};
use crate::protocol::messages::{DomainEvent, PROTOCOL_ID};
use crate::protocol::metadata::{peek_metadata, FrameMetadata};
use crate::protocol::response::{ResponseEncoder, ResponseReason, TokenSource};

/// Receives decoded events, in frame order.
#[cfg_attr(test, mockall::automock)]
pub trait EventSink {
    fn accept(&mut self, event: DomainEvent);
}

impl EventSink for Vec<DomainEvent> {
    fn accept(&mut self, event: DomainEvent) {
        self.push(event);
    }
}

/// Counters for one [`DataParser::process`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    /// Frames that passed framing and checksum validation.
    pub frames: usize,
    /// Events delivered to the sink.
    pub events: usize,
    /// Frames whose header or body failed to decode.
    pub failed: usize,
}

impl AddAssign for ProcessSummary {
    fn add_assign(&mut self, other: Self) {
        self.frames += other.frames;
        self.events += other.events;
        self.failed += other.failed;
    }
}

/// A protocol implementation selectable by version string.
pub trait DataParser: Send + Sync {
    /// Registry key, e.g. `"china-jtt808-2013.1"`.
    fn protocol_id(&self) -> &str;

    /// Removes every complete frame from the front of `buf`.
    fn extract(&self, buf: &mut BytesMut) -> Vec<Frame>;

    /// Decodes one frame into its header and events.
    fn decode(&self, frame: &Frame) -> Result<DecodedFrame, ProtocolError>;

    /// Builds the acknowledgement for `request`, if it warrants one.
    fn create_response(&self, request: &Frame, reason: ResponseReason) -> Option<Bytes>;

    /// Protocol and device of a raw frame, without a full decode.
    fn metadata(&self, raw: &[u8]) -> Result<FrameMetadata, ProtocolError>;

    /// Extracts and decodes everything in `buf`, delivering events to `sink`.
    ///
    /// A frame that fails to decode is logged and counted; it never stops the
    /// frames after it.
    fn process(&self, buf: &mut BytesMut, sink: &mut dyn EventSink) -> ProcessSummary {
        let mut summary = ProcessSummary::default();
        for frame in self.extract(buf) {
            summary.frames += 1;
            match self.decode(&frame) {
                Ok(decoded) => {
                    summary.events += decoded.events.len();
                    for event in decoded.events {
                        sink.accept(event);
                    }
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(msg_id = ?frame.msg_id().map(|id| format!("0x{id:04X}")), %err, "frame decode aborted");
                }
            }
        }
        debug!(frames = summary.frames, events = summary.events, failed = summary.failed, "processed buffer");
        summary
    }
}

/// JT/T 808-2013 parser.
#[derive(Debug, Clone, Default)]
pub struct Jtt808Parser {
    extractor: FrameExtractor,
    decoder: BodyDecoder,
    responses: ResponseEncoder,
}

impl Jtt808Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self {
            extractor: FrameExtractor::new(config.max_buffered_bytes),
            ..Self::default()
        }
    }

    /// Replaces the source of registration tokens.
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.responses = ResponseEncoder::new(tokens);
        self
    }

    /// Replaces the dispatch table.
    pub fn with_decoder(mut self, decoder: BodyDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn extractor(&self) -> &FrameExtractor {
        &self.extractor
    }

    /// Decodes with an explicit receive time.
    pub fn decode_at(&self, frame: &Frame, received_at: DateTime<Utc>) -> Result<DecodedFrame, ProtocolError> {
        self.decoder.decode(frame, received_at)
    }
}

impl DataParser for Jtt808Parser {
    fn protocol_id(&self) -> &str {
        PROTOCOL_ID
    }

    fn extract(&self, buf: &mut BytesMut) -> Vec<Frame> {
        self.extractor.extract(buf)
    }

    fn decode(&self, frame: &Frame) -> Result<DecodedFrame, ProtocolError> {
        self.decode_at(frame, Utc::now())
    }

    fn create_response(&self, request: &Frame, reason: ResponseReason) -> Option<Bytes> {
        self.responses.respond(request, reason)
    }

    fn metadata(&self, raw: &[u8]) -> Result<FrameMetadata, ProtocolError> {
        peek_metadata(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::builder::FrameBuilder;
    use crate::protocol::messages::{msg_id, EventKind};
    use mockall::predicate::function;

    fn heartbeat(device: &str, seq: u16) -> Bytes {
        FrameBuilder::new(msg_id::HEARTBEAT, device, seq).finish().unwrap()
    }

    #[test]
    fn test_process_delivers_events_in_order() {
        let mut data = BytesMut::new();
        data.extend_from_slice(&heartbeat("1", 1));
        data.extend_from_slice(&heartbeat("1", 2));

        let mut sink = MockEventSink::new();
        let mut seq = mockall::Sequence::new();
        for expected in [1u16, 2] {
            sink.expect_accept()
                .with(function(move |e: &DomainEvent| e.sequence_number() == expected))
                .times(1)
                .in_sequence(&mut seq)
                .return_const(());
        }

        let summary = Jtt808Parser::new().process(&mut data, &mut sink);
        assert_eq!(summary, ProcessSummary { frames: 2, events: 2, failed: 0 });
        assert!(data.is_empty());
    }

    #[test]
    fn test_failed_frame_does_not_stop_batch() {
        let truncated = FrameBuilder::new(msg_id::UPGRADE_RESULT, "1", 1).put_u8(0).finish().unwrap();
        let mut data = BytesMut::new();
        data.extend_from_slice(&truncated);
        data.extend_from_slice(&heartbeat("1", 2));

        let mut sink = MockEventSink::new();
        sink.expect_accept()
            .withf(|e| e.kind == EventKind::Heartbeat)
            .times(1)
            .return_const(());

        let summary = Jtt808Parser::new().process(&mut data, &mut sink);
        assert_eq!(summary, ProcessSummary { frames: 2, events: 1, failed: 1 });
    }

    #[test]
    fn test_unknown_message_is_not_a_failure() {
        let unknown = FrameBuilder::new(0x0F10, "1", 1).finish().unwrap();
        let mut data = BytesMut::from(&unknown[..]);
        let mut sink = MockEventSink::new();
        sink.expect_accept().never();

        let summary = Jtt808Parser::new().process(&mut data, &mut sink);
        assert_eq!(summary, ProcessSummary { frames: 1, events: 0, failed: 0 });
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut data = BytesMut::from(&heartbeat("012345678901", 7)[..]);
        let mut events: Vec<DomainEvent> = Vec::new();
        Jtt808Parser::new().process(&mut data, &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].device_id(), "012345678901");
    }

    #[test]
    fn test_config_sets_buffer_limit() {
        let config = CodecConfig { max_buffered_bytes: 64, ..CodecConfig::default() };
        let parser = Jtt808Parser::from_config(&config);
        assert_eq!(parser.extractor().max_buffered_bytes(), 64);

        let mut data = BytesMut::from(&vec![0u8; 65][..]);
        assert!(parser.extract(&mut data).is_empty());
        assert!(data.is_empty());
    }

    #[test]
    fn test_decode_at_uses_given_time() {
        let at = DateTime::parse_from_rfc3339("2024-03-15T08:30:59Z").unwrap().with_timezone(&Utc);
        let frame = Frame::from_wire(heartbeat("1", 1)).unwrap();
        let decoded = Jtt808Parser::new().decode_at(&frame, at).unwrap();
        assert_eq!(decoded.events[0].meta.received_at, at);
    }

    #[test]
    fn test_create_response_and_metadata() {
        let parser = Jtt808Parser::new().with_token_source(Arc::new(|| "abc".to_string()));
        let request = FrameBuilder::new(msg_id::REGISTER, "013912345678", 3).finish().unwrap();
        let frame = Frame::from_wire(request.clone()).unwrap();

        let reply = parser.create_response(&frame, ResponseReason::Ok).unwrap();
        assert_eq!(&reply[1..3], &[0x81, 0x00]);
        assert!(reply.ends_with(&[0x7E]));

        let meta = parser.metadata(&request).unwrap();
        assert_eq!(meta.protocol_id, parser.protocol_id());
        assert_eq!(meta.device_id, "013912345678");
    }

    #[test]
    fn test_summaries_add_up() {
        let mut total = ProcessSummary { frames: 1, events: 2, failed: 0 };
        total += ProcessSummary { frames: 3, events: 1, failed: 1 };
        assert_eq!(total, ProcessSummary { frames: 4, events: 3, failed: 1 });
    }
}
