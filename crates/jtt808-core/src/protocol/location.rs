//! Position family: 0x0200, 0x0201, 0x0500 and 0x0704.
//!
//! Every message in the family carries one or more position records:
//!
//! ```text
//! [alarm:4][status:4][lat:4][lon:4][altitude:2][speed:2][heading:2][time:6 BCD]
//! ([id:1][len:1][value:len])*
//! ```
//!
//! A record with a non-zero alarm word yields an extra Alarm event that
//! shares the record with its Position event.

use std::sync::Arc;

use tracing::trace;

use crate::protocol::error::ProtocolError;
use crate::protocol::header::Header;
use crate::protocol::messages::{
    AlarmFlags, AlarmRecord, BatchKind, EventKind, ExtraItem, PositionRecord, PositionSource,
    StatusFlags,
};
use crate::protocol::reader::BodyReader;

/// Size of the fixed position core.
pub const POSITION_CORE_SIZE: usize = 28;

const COORDINATE_SCALE: f64 = 1_000_000.0;

/// Decodes the 28-byte core without extension items.
pub fn decode_core(r: &mut BodyReader<'_>, source: PositionSource) -> Result<PositionRecord, ProtocolError> {
    let mut core = r.sub_reader(POSITION_CORE_SIZE, "position_core")?;
    let alarm = AlarmFlags(core.u32("alarm")?);
    let status = StatusFlags(core.u32("status")?);

    // The wire carries magnitudes; the hemisphere lives in the status word.
    let mut latitude = f64::from(core.i32("latitude")?) / COORDINATE_SCALE;
    if status.south() {
        latitude = -latitude;
    }
    let mut longitude = f64::from(core.i32("longitude")?) / COORDINATE_SCALE;
    if status.west() {
        longitude = -longitude;
    }

    let altitude_m = core.u16("altitude")?;
    let speed_kmh = f64::from(core.u16("speed")?) / 10.0;
    let heading = core.u16("heading")?;
    let time = core.datetime("time")?;

    Ok(PositionRecord {
        alarm,
        status,
        latitude,
        longitude,
        altitude_m,
        speed_kmh,
        heading,
        time,
        extras: Vec::new(),
        source,
    })
}

/// Decodes a core followed by extension items running to the end of `r`.
pub fn decode_record(r: &mut BodyReader<'_>, source: PositionSource) -> Result<PositionRecord, ProtocolError> {
    let mut record = decode_core(r, source)?;
    while !r.is_empty() {
        let id = r.u8("extra_id")?;
        let len = usize::from(r.u8("extra_len")?);
        let value = r.bytes(len, "extra_value")?.to_vec();
        trace!(id = format_args!("0x{id:02X}"), len, "position extra");
        record.extras.push(ExtraItem { id, value });
    }
    Ok(record)
}

/// Position event, plus an Alarm event when the alarm word is non-zero.
pub fn position_events(record: PositionRecord) -> Vec<EventKind> {
    let has_alarm = !record.alarm.is_empty();
    let alarms = record.alarm.kinds();
    let position = Arc::new(record);
    let mut events = vec![EventKind::Position(Arc::clone(&position))];
    if has_alarm {
        events.push(EventKind::Alarm(AlarmRecord { position, alarms }));
    }
    events
}

// ── Decoders ──────────────────────────────────────────────────────────────────

/// 0x0200 position report.
pub fn decode_report(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let record = decode_record(r, PositionSource::Report)?;
    Ok(position_events(record))
}

/// 0x0201 position query reply.
pub fn decode_query_reply(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let ack_sequence = r.u16("ack_sequence")?;
    let record = decode_record(r, PositionSource::QueryReply { ack_sequence })?;
    Ok(position_events(record))
}

/// 0x0500 vehicle control reply.
pub fn decode_vehicle_control_reply(
    _header: &Header,
    r: &mut BodyReader<'_>,
) -> Result<Vec<EventKind>, ProtocolError> {
    let ack_sequence = r.u16("ack_sequence")?;
    let record = decode_record(r, PositionSource::VehicleControlReply { ack_sequence })?;
    Ok(position_events(record))
}

/// 0x0704 batch upload: `[count:2][kind:1]` then `count` times
/// `[len:2][record:len]`.
pub fn decode_batch(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let count = r.u16("batch_count")?;
    let kind = BatchKind::from(r.u8("batch_kind")?);
    let mut events = Vec::new();
    for index in 0..count {
        let len = usize::from(r.u16("batch_item_len")?);
        let mut item = r.sub_reader(len, "batch_item")?;
        let record = decode_record(&mut item, PositionSource::Batch { index, kind })?;
        events.extend(position_events(record));
    }
    Ok(events)
}
