//! Body decoding: a lookup table from message id to decoder function.
//!
//! A decoder receives the parsed [`Header`] and a [`BodyReader`] bounded by
//! the declared body length, and returns the event payloads it found.
//! [`BodyDecoder::decode`] wraps them with the frame's [`EventMeta`].
//!
//! Unknown ids, encrypted bodies and sub-packet fragments of anything but a
//! media upload produce zero events. A decoder error aborts only the frame it
//! was decoding.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::protocol::error::ProtocolError;
use crate::protocol::frame::Frame;
use crate::protocol::header::Header;
use crate::protocol::messages::{msg_id, DomainEvent, EventKind, EventMeta};
use crate::protocol::reader::BodyReader;
use crate::protocol::{location, media, terminal};

/// Signature shared by every body decoder.
pub type DecodeFn = fn(&Header, &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError>;

/// A frame's header together with the events decoded from its body.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub header: Header,
    pub events: Vec<DomainEvent>,
}

/// Message-id dispatch table.
#[derive(Clone)]
pub struct BodyDecoder {
    table: HashMap<u16, DecodeFn>,
}

impl fmt::Debug for BodyDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.table.keys().copied().collect();
        ids.sort_unstable();
        f.debug_struct("BodyDecoder").field("msg_ids", &ids).finish()
    }
}

impl Default for BodyDecoder {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BodyDecoder {
    /// A table with no entries; every message decodes to zero events.
    pub fn empty() -> Self {
        Self { table: HashMap::new() }
    }

    /// A table with every terminal → platform message of the 2013 revision.
    pub fn with_defaults() -> Self {
        let mut decoder = Self::empty();
        let entries: [(u16, DecodeFn); 26] = [
            (msg_id::TERMINAL_ACK, terminal::decode_terminal_ack),
            (msg_id::HEARTBEAT, terminal::decode_heartbeat),
            (msg_id::DEREGISTER, terminal::decode_deregister),
            (msg_id::REGISTER, terminal::decode_register),
            (msg_id::AUTHENTICATION, terminal::decode_authentication),
            (msg_id::PARAMETER_QUERY_RESULT, terminal::decode_parameter_query_result),
            (msg_id::DEVICE_PROPERTIES, terminal::decode_device_properties),
            (msg_id::UPGRADE_RESULT, terminal::decode_upgrade_result),
            (msg_id::POSITION_REPORT, location::decode_report),
            (msg_id::POSITION_QUERY_REPLY, location::decode_query_reply),
            (msg_id::EVENT_REPORT, terminal::decode_event_report),
            (msg_id::QUESTION_ANSWER, terminal::decode_question_answer),
            (msg_id::INFO_DEMAND, terminal::decode_info_demand),
            (msg_id::VEHICLE_CONTROL_REPLY, location::decode_vehicle_control_reply),
            (msg_id::RECORDER_UPLOAD, traverse_recorder_upload),
            (msg_id::WAYBILL_UPLOAD, traverse_length_prefixed),
            (msg_id::DRIVER_IDENTITY, terminal::decode_driver_identity),
            (msg_id::POSITION_BATCH, location::decode_batch),
            (msg_id::CAN_UPLOAD, traverse_can_upload),
            (msg_id::MEDIA_EVENT, media::decode_event),
            (msg_id::MEDIA_UPLOAD, media::decode_upload),
            (msg_id::MEDIA_QUERY_RESULT, media::decode_query_result),
            (msg_id::CAMERA_SHOT_REPLY, media::decode_camera_reply),
            (msg_id::PASSTHROUGH, traverse_passthrough),
            (msg_id::COMPRESSED_UPLOAD, traverse_length_prefixed),
            (msg_id::RSA_PUBLIC_KEY, terminal::decode_rsa_public_key),
        ];
        for (id, decode) in entries {
            decoder.register(id, decode);
        }
        decoder
    }

    /// Installs (or replaces) the decoder for `id`, returning the previous one.
    pub fn register(&mut self, id: u16, decode: DecodeFn) -> Option<DecodeFn> {
        self.table.insert(id, decode)
    }

    pub fn supports(&self, id: u16) -> bool {
        self.table.contains_key(&id)
    }

    /// Decodes a validated frame.
    ///
    /// # Errors
    ///
    /// Any header or body decode failure. The caller drops this frame and
    /// carries on with the next one.
    pub fn decode(&self, frame: &Frame, received_at: DateTime<Utc>) -> Result<DecodedFrame, ProtocolError> {
        let (header, body) = frame.header()?;
        let events = self.decode_body(&header, body, received_at)?;
        Ok(DecodedFrame { header, events })
    }

    /// Decodes a body whose header has already been parsed.
    pub fn decode_body(
        &self,
        header: &Header,
        body: &[u8],
        received_at: DateTime<Utc>,
    ) -> Result<Vec<DomainEvent>, ProtocolError> {
        let id = header.msg_id;

        let Some(decode) = self.table.get(&id) else {
            debug!(msg_id = format_args!("0x{id:04X}"), device_id = %header.device_id, "unknown message id");
            return Ok(Vec::new());
        };

        if header.encrypt_mode.is_encrypted() && !body.is_empty() {
            debug!(
                msg_id = format_args!("0x{id:04X}"),
                encrypt_mode = ?header.encrypt_mode,
                "encrypted body not decoded"
            );
            return Ok(Vec::new());
        }

        if header.is_sub_packaged() && id != msg_id::MEDIA_UPLOAD {
            debug!(
                msg_id = format_args!("0x{id:04X}"),
                sub_packet = ?header.sub_packet,
                "sub-packet fragment not decoded"
            );
            return Ok(Vec::new());
        }

        let mut reader = BodyReader::new(body);
        let kinds = decode(header, &mut reader)?;
        if !reader.is_empty() {
            debug!(
                msg_id = format_args!("0x{id:04X}"),
                trailing = reader.remaining(),
                "skipping trailing body bytes"
            );
        }

        let meta = EventMeta {
            device_id: header.device_id.clone(),
            sequence_number: header.sequence_number,
            msg_id: id,
            received_at,
        };
        Ok(kinds
            .into_iter()
            .map(|kind| DomainEvent { meta: meta.clone(), kind })
            .collect())
    }
}

// ── Length-traversed messages ─────────────────────────────────────────────────
//
// Recognised so they are not reported as unknown, but their payloads are
// vendor-defined and produce no event.

/// 0x0700: `[ack_seq:2][command:1][data]`
fn traverse_recorder_upload(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let ack_sequence = r.u16("ack_sequence")?;
    let command = r.u8("recorder_command")?;
    let data = r.rest();
    trace!(ack_sequence, command, len = data.len(), "recorder data");
    Ok(Vec::new())
}

/// 0x0701 and 0x0901: `[len:4][data:len]`
fn traverse_length_prefixed(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let len = r.u32("payload_len")? as usize;
    r.bytes(len, "payload")?;
    trace!(len, "length-prefixed payload");
    Ok(Vec::new())
}

/// 0x0705: `[count:2][receive_time:5]` then `count` times `[can_id:4][data:8]`.
fn traverse_can_upload(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let count = r.u16("can_item_count")?;
    r.bytes(5, "can_receive_time")?;
    for _ in 0..count {
        r.bytes(12, "can_item")?;
    }
    trace!(count, "can items");
    Ok(Vec::new())
}

/// 0x0900: `[type:1][data]`
fn traverse_passthrough(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let kind = r.u8("passthrough_type")?;
    let data = r.rest();
    trace!(kind, len = data.len(), "passthrough payload");
    Ok(Vec::new())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
