//! Multimedia messages: 0x0800, 0x0801, 0x0802 and 0x0805.

use tracing::debug;

use crate::protocol::error::ProtocolError;
use crate::protocol::header::Header;
use crate::protocol::location::decode_core;
use crate::protocol::messages::{
    EventKind, MediaDescriptor, MediaEventCode, MediaFormat, MediaQueryResult, MediaRecord, MediaType,
    PositionSource, ResultRecord, StoredMedia,
};
use crate::protocol::reader::BodyReader;

/// `[media_id:4][type:1][format:1][event:1][channel:1]`
fn decode_descriptor(r: &mut BodyReader<'_>) -> Result<MediaDescriptor, ProtocolError> {
    Ok(MediaDescriptor {
        media_id: r.u32("media_id")?,
        media_type: MediaType::from(r.u8("media_type")?),
        format: MediaFormat::from(r.u8("media_format")?),
        event_code: MediaEventCode::from(r.u8("media_event")?),
        channel_id: r.u8("channel_id")?,
    })
}

/// 0x0800 media event.
pub fn decode_event(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let descriptor = decode_descriptor(r)?;
    Ok(vec![EventKind::Media(MediaRecord {
        descriptor: Some(descriptor),
        position: None,
        data: Vec::new(),
        sub_packet: None,
    })])
}

/// 0x0801 media upload.
///
/// The first (or only) packet starts with the descriptor and a position
/// core; every packet ends with an opaque chunk of media data.
pub fn decode_upload(header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let first = header.sub_packet.map_or(true, |p| p.is_first());
    let (descriptor, position) = if first {
        let descriptor = decode_descriptor(r)?;
        let position = decode_core(r, PositionSource::Embedded)?;
        (Some(descriptor), Some(position))
    } else {
        (None, None)
    };
    let data = r.rest().to_vec();
    debug!(
        media_id = descriptor.map(|d| d.media_id),
        chunk = data.len(),
        sub_packet = ?header.sub_packet,
        "media chunk"
    );
    Ok(vec![EventKind::Media(MediaRecord {
        descriptor,
        position,
        data,
        sub_packet: header.sub_packet,
    })])
}

/// 0x0802 stored media search reply: `[ack_seq:2][count:2]` then `count`
/// times `[media_id:4][type:1][channel:1][event:1][position core:28]`.
pub fn decode_query_result(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let ack_sequence = r.u16("ack_sequence")?;
    let count = r.u16("media_count")?;
    let mut items = Vec::with_capacity(usize::from(count).min(r.remaining() / 35 + 1));
    for _ in 0..count {
        items.push(StoredMedia {
            media_id: r.u32("media_id")?,
            media_type: MediaType::from(r.u8("media_type")?),
            channel_id: r.u8("channel_id")?,
            event_code: MediaEventCode::from(r.u8("media_event")?),
            position: decode_core(r, PositionSource::Embedded)?,
        });
    }
    Ok(vec![EventKind::MediaQueryResult(MediaQueryResult { ack_sequence, items })])
}

/// 0x0805 camera shot reply: `[ack_seq:2][result:1]`, then on success
/// `[count:2]` and `count` media ids.
pub fn decode_camera_reply(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let ack_sequence = r.u16("ack_sequence")?;
    let code = r.u8("result")?;
    let mut media_ids = Vec::new();
    if code == 0 && !r.is_empty() {
        let count = r.u16("media_count")?;
        for _ in 0..count {
            media_ids.push(r.u32("media_id")?);
        }
    }
    Ok(vec![EventKind::Result(ResultRecord {
        ack_sequence: Some(ack_sequence),
        code,
        media_ids,
        ..ResultRecord::default()
    })])
}
