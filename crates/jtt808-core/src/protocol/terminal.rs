//! Terminal management and information messages.

use tracing::trace;

use crate::protocol::error::ProtocolError;
use crate::protocol::header::Header;
use crate::protocol::messages::{
    Authentication, CommCapabilities, DeviceProperties, DriverIdentity, EventKind, GnssCapabilities,
    IcCardStatus, IcReadResult, ParameterQueryResult, PlateColor, Registration, ResultRecord, RsaPublicKey,
    TerminalParameter, UpgradeOutcome, UpgradeResult, UpgradeTarget, VehicleIdentity,
};
use crate::protocol::reader::BodyReader;

/// Width of the manufacturer id text field.
pub const MANUFACTURER_ID_LEN: usize = 5;
/// Width of the terminal model text field.
pub const MODEL_LEN: usize = 20;
/// Width of the terminal id text field.
pub const TERMINAL_ID_LEN: usize = 7;
/// Width of the SIM ICCID in BCD bytes.
pub const ICCID_LEN: usize = 10;
/// Width of the driver certificate code.
pub const CERTIFICATE_CODE_LEN: usize = 20;
/// Width of the RSA modulus.
pub const RSA_MODULUS_LEN: usize = 128;

/// 0x0001: `[ack_seq:2][ack_msg_id:2][result:1]`
pub fn decode_terminal_ack(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    Ok(vec![EventKind::Result(ResultRecord {
        ack_sequence: Some(r.u16("ack_sequence")?),
        ack_msg_id: Some(r.u16("ack_msg_id")?),
        code: r.u8("result")?,
        ..ResultRecord::default()
    })])
}

pub fn decode_heartbeat(_header: &Header, _r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    Ok(vec![EventKind::Heartbeat])
}

pub fn decode_deregister(_header: &Header, _r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    Ok(vec![EventKind::Deregister])
}

/// 0x0100 terminal registration.
pub fn decode_register(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let province_id = r.u16("province_id")?;
    let city_id = r.u16("city_id")?;
    let manufacturer_id = r.text(MANUFACTURER_ID_LEN, "manufacturer_id")?;
    let model = r.text(MODEL_LEN, "model")?;
    let terminal_id = r.text(TERMINAL_ID_LEN, "terminal_id")?;
    let plate_color = PlateColor::from(r.u8("plate_color")?);
    let identifier = r.rest_text();
    let vehicle = if plate_color == PlateColor::Unplated {
        VehicleIdentity::Vin(identifier)
    } else {
        VehicleIdentity::Plate(identifier)
    };
    trace!(province_id, city_id, %manufacturer_id, %terminal_id, ?vehicle, "registration");

    Ok(vec![EventKind::Register(Registration {
        province_id,
        city_id,
        manufacturer_id,
        model,
        terminal_id,
        plate_color,
        vehicle,
    })])
}

/// 0x0102: the whole body is the token issued at registration.
pub fn decode_authentication(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    Ok(vec![EventKind::Authentication(Authentication { token: r.rest_text() })])
}

/// 0x0104: `[ack_seq:2][count:1]` then `count` times `[id:4][len:1][value]`.
pub fn decode_parameter_query_result(
    _header: &Header,
    r: &mut BodyReader<'_>,
) -> Result<Vec<EventKind>, ProtocolError> {
    let ack_sequence = r.u16("ack_sequence")?;
    let count = r.u8("parameter_count")?;
    let mut parameters = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let id = r.u32("parameter_id")?;
        let len = usize::from(r.u8("parameter_len")?);
        let value = r.bytes(len, "parameter_value")?.to_vec();
        parameters.push(TerminalParameter { id, value });
    }
    Ok(vec![EventKind::ParameterQueryResult(ParameterQueryResult {
        ack_sequence,
        parameters,
    })])
}

/// 0x0107 terminal properties.
pub fn decode_device_properties(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let terminal_type = r.u16("terminal_type")?;
    let manufacturer_id = r.text(MANUFACTURER_ID_LEN, "manufacturer_id")?;
    let model = r.text(MODEL_LEN, "model")?;
    let terminal_id = r.text(TERMINAL_ID_LEN, "terminal_id")?;
    let iccid = r.bcd(ICCID_LEN, "iccid")?;
    let hardware_version = r.text_u8("hardware_version")?;
    let firmware_version = r.text_u8("firmware_version")?;
    let gnss = GnssCapabilities(r.u8("gnss_capabilities")?);
    let comms = CommCapabilities(r.u8("comm_capabilities")?);

    Ok(vec![EventKind::DeviceProperties(DeviceProperties {
        terminal_type,
        manufacturer_id,
        model,
        terminal_id,
        iccid,
        hardware_version,
        firmware_version,
        gnss,
        comms,
    })])
}

/// 0x0108: `[target:1][outcome:1]`
pub fn decode_upgrade_result(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    Ok(vec![EventKind::UpgradeResult(UpgradeResult {
        target: UpgradeTarget::from(r.u8("upgrade_target")?),
        outcome: UpgradeOutcome::from(r.u8("upgrade_outcome")?),
    })])
}

/// 0x0301: `[event_id:1]`
pub fn decode_event_report(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    Ok(vec![EventKind::Result(ResultRecord {
        code: r.u8("event_id")?,
        ..ResultRecord::default()
    })])
}

/// 0x0302: `[ack_seq:2][answer_id:1]`
pub fn decode_question_answer(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    Ok(vec![EventKind::Result(ResultRecord {
        ack_sequence: Some(r.u16("ack_sequence")?),
        code: r.u8("answer_id")?,
        ..ResultRecord::default()
    })])
}

/// 0x0303: `[info_type:1][flag:1]`, flag 1 subscribes and 0 cancels.
pub fn decode_info_demand(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    Ok(vec![EventKind::Result(ResultRecord {
        code: r.u8("info_type")?,
        flag: Some(r.u8("demand_flag")?),
        ..ResultRecord::default()
    })])
}

/// 0x0702 driver identity.
pub fn decode_driver_identity(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let status = IcCardStatus::from(r.u8("ic_status")?);
    let time = r.datetime("ic_time")?;
    let mut driver = DriverIdentity {
        status,
        time,
        read_result: None,
        name: None,
        certificate_code: None,
        issuing_authority: None,
        certificate_expiry: None,
    };

    if status == IcCardStatus::Inserted {
        let read_result = IcReadResult::from(r.u8("ic_read_result")?);
        driver.read_result = Some(read_result);
        if read_result == IcReadResult::Success {
            driver.name = Some(r.text_u8("driver_name")?);
            driver.certificate_code = Some(r.text(CERTIFICATE_CODE_LEN, "certificate_code")?);
            driver.issuing_authority = Some(r.text_u8("issuing_authority")?);
            driver.certificate_expiry = r.date("certificate_expiry")?;
        }
    }

    Ok(vec![EventKind::Driver(driver)])
}

/// 0x0A00: `[e:4][n:128]`
pub fn decode_rsa_public_key(_header: &Header, r: &mut BodyReader<'_>) -> Result<Vec<EventKind>, ProtocolError> {
    let e = r.u32("rsa_e")?;
    let n = r.bytes(RSA_MODULUS_LEN, "rsa_n")?.to_vec();
    Ok(vec![EventKind::Rsa(RsaPublicKey { e, n })])
}
