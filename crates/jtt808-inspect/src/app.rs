//! Drives a capture through a parser the way a connection handler would:
//! chunked reads into one buffer, extraction after every read, events out as
//! JSON records.

use std::io::{self, Write};
use std::sync::Arc;

use bytes::BytesMut;
use jtt808_core::{
    CodecConfig, DataParser, DomainEvent, EventSink, Frame, Jtt808Parser, ParserRegistry, ProcessSummary,
    ResponseReason,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::OutputConfig;

/// One line (or pretty block) of output.
#[derive(Debug, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum OutputRecord<'a> {
    Event(&'a DomainEvent),
    Response(ResponseRecord<'a>),
}

/// The acknowledgement the platform would send back for a frame.
#[derive(Debug, Serialize)]
pub struct ResponseRecord<'a> {
    pub device_id: &'a str,
    pub request_msg_id: String,
    pub sequence_number: u16,
    pub reason: &'static str,
    pub hex: String,
}

// ── JSON sink ─────────────────────────────────────────────────────────────────

/// Writes records as JSON.
///
/// [`EventSink::accept`] cannot fail, so the first write error is held and
/// every later record is dropped until [`JsonLines::finish`] reports it.
pub struct JsonLines<W: Write> {
    out: W,
    pretty: bool,
    error: Option<io::Error>,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W, pretty: bool) -> Self {
        Self { out, pretty, error: None }
    }

    pub fn write(&mut self, record: &OutputRecord<'_>) {
        if self.error.is_some() {
            return;
        }
        let result = if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, record)
        } else {
            serde_json::to_writer(&mut self.out, record)
        };
        if let Err(err) = result.map_err(io::Error::from).and_then(|()| self.out.write_all(b"\n")) {
            self.error = Some(err);
        }
    }

    /// Flushes and returns the writer, or the first error seen.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> EventSink for JsonLines<W> {
    fn accept(&mut self, event: DomainEvent) {
        self.write(&OutputRecord::Event(&event));
    }
}

// ── Parser selection ──────────────────────────────────────────────────────────

/// Registry of the parsers this tool knows, built from `codec`.
pub fn build_registry(codec: &CodecConfig) -> ParserRegistry {
    let mut registry = ParserRegistry::new();
    registry.register(Arc::new(Jtt808Parser::from_config(codec)));
    registry
}

/// The parser for `codec.protocol_version`, if one is registered.
pub fn select_parser(codec: &CodecConfig) -> Option<Arc<dyn DataParser>> {
    build_registry(codec).get(&codec.protocol_version)
}

// ── Run loop ──────────────────────────────────────────────────────────────────

/// Feeds `capture` to `parser` in `options.chunk_size` pieces and writes the
/// decoded events (and acknowledgements if enabled) to `out`.
///
/// Frames that fail to decode are counted and answered with an `Invalid`
/// acknowledgement; they never stop the run.
///
/// # Errors
///
/// Returns an error only if writing to `out` fails.
pub fn run<W: Write>(
    parser: &dyn DataParser,
    capture: &[u8],
    options: &OutputConfig,
    out: W,
) -> io::Result<ProcessSummary> {
    let mut sink = JsonLines::new(out, options.pretty);
    let mut buf = BytesMut::with_capacity(options.chunk_size.max(1));
    let mut summary = ProcessSummary::default();

    for chunk in capture.chunks(options.chunk_size.max(1)) {
        buf.extend_from_slice(chunk);
        for frame in parser.extract(&mut buf) {
            summary.frames += 1;
            let reason = match parser.decode(&frame) {
                Ok(decoded) => {
                    summary.events += decoded.events.len();
                    for event in decoded.events {
                        sink.accept(event);
                    }
                    ResponseReason::Ok
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(%err, raw = %hex::encode_upper(frame.raw()), "frame decode aborted");
                    ResponseReason::Invalid
                }
            };
            if options.emit_responses {
                write_response(parser, &frame, reason, &mut sink);
            }
        }
    }

    if !buf.is_empty() {
        debug!(pending = buf.len(), "capture ended inside a frame");
    }
    sink.finish()?;
    Ok(summary)
}

fn write_response<W: Write>(parser: &dyn DataParser, frame: &Frame, reason: ResponseReason, sink: &mut JsonLines<W>) {
    let Some(reply) = parser.create_response(frame, reason) else {
        return;
    };
    let Ok((header, _)) = frame.header() else {
        return;
    };
    let record = ResponseRecord {
        device_id: &header.device_id,
        request_msg_id: format!("0x{:04X}", header.msg_id),
        sequence_number: header.sequence_number,
        reason: match reason {
            ResponseReason::Ok => "ok",
            ResponseReason::Failed => "failed",
            ResponseReason::Invalid => "invalid",
            ResponseReason::Unsupported => "unsupported",
        },
        hex: hex::encode_upper(&reply),
    };
    sink.write(&OutputRecord::Response(record));
}

#[cfg(test)]
mod tests {
    use super::*;
    use jtt808_core::protocol::messages::msg_id;
    use jtt808_core::FrameBuilder;

    fn options(chunk_size: usize, emit_responses: bool) -> OutputConfig {
        OutputConfig { chunk_size, emit_responses, ..OutputConfig::default() }
    }

    fn lines(out: &[u8]) -> Vec<serde_json::Value> {
        std::str::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_events_written_one_per_line() {
        let mut capture = FrameBuilder::new(msg_id::HEARTBEAT, "1", 1).finish().unwrap().to_vec();
        capture.extend_from_slice(&FrameBuilder::new(msg_id::DEREGISTER, "1", 2).finish().unwrap());

        let mut out = Vec::new();
        let summary = run(&Jtt808Parser::new(), &capture, &options(3, false), &mut out).unwrap();
        assert_eq!(summary, ProcessSummary { frames: 2, events: 2, failed: 0 });

        let records = lines(&out);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["record"], "event");
        assert_eq!(records[0]["kind"]["type"], "Heartbeat");
        assert_eq!(records[1]["kind"]["type"], "Deregister");
    }

    #[test]
    fn test_responses_follow_their_events() {
        let capture = FrameBuilder::new(msg_id::HEARTBEAT, "013912345678", 9).finish().unwrap();
        let mut out = Vec::new();
        run(&Jtt808Parser::new(), &capture, &options(1024, true), &mut out).unwrap();

        let records = lines(&out);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["record"], "response");
        assert_eq!(records[1]["request_msg_id"], "0x0002");
        assert_eq!(records[1]["reason"], "ok");
        assert!(records[1]["hex"].as_str().unwrap().starts_with("7E8001"));
    }

    #[test]
    fn test_failed_decode_answered_invalid() {
        let capture = FrameBuilder::new(msg_id::REGISTER, "1", 1).put_u8(0).finish().unwrap();
        let mut out = Vec::new();
        let summary = run(&Jtt808Parser::new(), &capture, &options(1024, true), &mut out).unwrap();
        assert_eq!(summary.failed, 1);

        let records = lines(&out);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["reason"], "invalid");
    }

    #[test]
    fn test_zero_chunk_size_still_progresses() {
        let capture = FrameBuilder::new(msg_id::HEARTBEAT, "1", 1).finish().unwrap();
        let mut out = Vec::new();
        let summary = run(&Jtt808Parser::new(), &capture, &options(0, false), &mut out).unwrap();
        assert_eq!(summary.events, 1);
    }

    #[test]
    fn test_select_parser_by_version() {
        let codec = CodecConfig::default();
        let parser = select_parser(&codec).unwrap();
        assert_eq!(parser.protocol_id(), "china-jtt808-2013.1");

        let unknown = CodecConfig { protocol_version: "china-jtt808-2019".into(), ..codec };
        assert!(select_parser(&unknown).is_none());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error_is_reported() {
        let capture = FrameBuilder::new(msg_id::HEARTBEAT, "1", 1).finish().unwrap();
        let err = run(&Jtt808Parser::new(), &capture, &options(1024, false), BrokenPipe).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
