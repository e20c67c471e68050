//! Message ids and the domain events decoded from JT/T 808 message bodies.
//!
//! Every decoded frame yields zero or more [`DomainEvent`]s. Each event
//! carries the [`EventMeta`] of the frame it came from plus an [`EventKind`]
//! describing the payload.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::header::SubPacket;

// ── Protocol constants ────────────────────────────────────────────────────────

/// Registry key of the 2013 revision.
pub const PROTOCOL_ID: &str = "china-jtt808-2013.1";

/// Message ids handled by the codec.
pub mod msg_id {
    // Terminal → platform
    pub const TERMINAL_ACK: u16 = 0x0001;
    pub const HEARTBEAT: u16 = 0x0002;
    pub const DEREGISTER: u16 = 0x0003;
    pub const REGISTER: u16 = 0x0100;
    pub const AUTHENTICATION: u16 = 0x0102;
    pub const PARAMETER_QUERY_RESULT: u16 = 0x0104;
    pub const DEVICE_PROPERTIES: u16 = 0x0107;
    pub const UPGRADE_RESULT: u16 = 0x0108;
    pub const POSITION_REPORT: u16 = 0x0200;
    pub const POSITION_QUERY_REPLY: u16 = 0x0201;
    pub const EVENT_REPORT: u16 = 0x0301;
    pub const QUESTION_ANSWER: u16 = 0x0302;
    pub const INFO_DEMAND: u16 = 0x0303;
    pub const VEHICLE_CONTROL_REPLY: u16 = 0x0500;
    pub const RECORDER_UPLOAD: u16 = 0x0700;
    pub const WAYBILL_UPLOAD: u16 = 0x0701;
    pub const DRIVER_IDENTITY: u16 = 0x0702;
    pub const POSITION_BATCH: u16 = 0x0704;
    pub const CAN_UPLOAD: u16 = 0x0705;
    pub const MEDIA_EVENT: u16 = 0x0800;
    pub const MEDIA_UPLOAD: u16 = 0x0801;
    pub const MEDIA_QUERY_RESULT: u16 = 0x0802;
    pub const CAMERA_SHOT_REPLY: u16 = 0x0805;
    pub const PASSTHROUGH: u16 = 0x0900;
    pub const COMPRESSED_UPLOAD: u16 = 0x0901;
    pub const RSA_PUBLIC_KEY: u16 = 0x0A00;

    // Platform → terminal
    pub const PLATFORM_ACK: u16 = 0x8001;
    pub const REGISTER_REPLY: u16 = 0x8100;
}

// ── Event envelope ────────────────────────────────────────────────────────────

/// Fields every event inherits from its frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    /// Terminal phone number, 12 digits.
    pub device_id: String,
    pub sequence_number: u16,
    pub msg_id: u16,
    /// When the frame was decoded.
    pub received_at: DateTime<Utc>,
}

/// One decoded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub meta: EventMeta,
    pub kind: EventKind,
}

impl DomainEvent {
    pub fn device_id(&self) -> &str {
        &self.meta.device_id
    }

    pub fn sequence_number(&self) -> u16 {
        self.meta.sequence_number
    }
}

/// Payload of a [`DomainEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
    Heartbeat,
    Register(Registration),
    Deregister,
    Authentication(Authentication),
    ParameterQueryResult(ParameterQueryResult),
    DeviceProperties(DeviceProperties),
    UpgradeResult(UpgradeResult),
    Position(Arc<PositionRecord>),
    Alarm(AlarmRecord),
    Result(ResultRecord),
    Driver(DriverIdentity),
    Media(MediaRecord),
    MediaQueryResult(MediaQueryResult),
    Rsa(RsaPublicKey),
}

// ── Registration / authentication ─────────────────────────────────────────────

/// Licence plate colour (JT/T 415).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlateColor {
    Unplated,
    Blue,
    Yellow,
    Black,
    White,
    Other,
    Unknown(u8),
}

impl From<u8> for PlateColor {
    fn from(value: u8) -> Self {
        match value {
            0 => PlateColor::Unplated,
            1 => PlateColor::Blue,
            2 => PlateColor::Yellow,
            3 => PlateColor::Black,
            4 => PlateColor::White,
            9 => PlateColor::Other,
            other => PlateColor::Unknown(other),
        }
    }
}

/// Trailing vehicle identifier of a registration: the VIN for unplated
/// vehicles, otherwise the licence plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleIdentity {
    Vin(String),
    Plate(String),
}

/// TERMINAL REGISTER (0x0100).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub province_id: u16,
    pub city_id: u16,
    pub manufacturer_id: String,
    pub model: String,
    pub terminal_id: String,
    pub plate_color: PlateColor,
    pub vehicle: VehicleIdentity,
}

/// TERMINAL AUTHENTICATION (0x0102).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    pub token: String,
}

// ── Terminal parameters and properties ────────────────────────────────────────

/// One parameter of a 0x0104 reply. The value is kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalParameter {
    pub id: u32,
    pub value: Vec<u8>,
}

/// QUERY TERMINAL PARAMETERS REPLY (0x0104).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterQueryResult {
    pub ack_sequence: u16,
    pub parameters: Vec<TerminalParameter>,
}

/// Satellite systems supported by the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GnssCapabilities(pub u8);

impl GnssCapabilities {
    pub const GPS: u8 = 1 << 0;
    pub const BEIDOU: u8 = 1 << 1;
    pub const GLONASS: u8 = 1 << 2;
    pub const GALILEO: u8 = 1 << 3;

    pub fn gps(&self) -> bool {
        self.0 & Self::GPS != 0
    }

    pub fn beidou(&self) -> bool {
        self.0 & Self::BEIDOU != 0
    }

    pub fn glonass(&self) -> bool {
        self.0 & Self::GLONASS != 0
    }

    pub fn galileo(&self) -> bool {
        self.0 & Self::GALILEO != 0
    }
}

/// Cellular technologies supported by the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommCapabilities(pub u8);

impl CommCapabilities {
    pub const GPRS: u8 = 1 << 0;
    pub const CDMA: u8 = 1 << 1;
    pub const TD_SCDMA: u8 = 1 << 2;
    pub const WCDMA: u8 = 1 << 3;
    pub const CDMA2000: u8 = 1 << 4;
    pub const TD_LTE: u8 = 1 << 5;
    pub const OTHER: u8 = 1 << 7;

    pub fn supports(&self, flag: u8) -> bool {
        self.0 & flag != 0
    }
}

/// QUERY TERMINAL PROPERTIES REPLY (0x0107).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProperties {
    /// Terminal type bitfield (passenger, dangerous goods, freight, taxi, ...).
    pub terminal_type: u16,
    pub manufacturer_id: String,
    pub model: String,
    pub terminal_id: String,
    /// SIM ICCID, 20 BCD digits.
    pub iccid: String,
    pub hardware_version: String,
    pub firmware_version: String,
    pub gnss: GnssCapabilities,
    pub comms: CommCapabilities,
}

/// Component an upgrade was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeTarget {
    Terminal,
    IcCardReader,
    BeidouModule,
    Unknown(u8),
}

impl From<u8> for UpgradeTarget {
    fn from(value: u8) -> Self {
        match value {
            0 => UpgradeTarget::Terminal,
            12 => UpgradeTarget::IcCardReader,
            52 => UpgradeTarget::BeidouModule,
            other => UpgradeTarget::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeOutcome {
    Success,
    Failure,
    Cancelled,
    Unknown(u8),
}

impl From<u8> for UpgradeOutcome {
    fn from(value: u8) -> Self {
        match value {
            0 => UpgradeOutcome::Success,
            1 => UpgradeOutcome::Failure,
            2 => UpgradeOutcome::Cancelled,
            other => UpgradeOutcome::Unknown(other),
        }
    }
}

/// UPGRADE RESULT NOTIFICATION (0x0108).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeResult {
    pub target: UpgradeTarget,
    pub outcome: UpgradeOutcome,
}

// ── Position and alarms ───────────────────────────────────────────────────────

/// Status word of a position record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusFlags(pub u32);

impl StatusFlags {
    pub const ACC_ON: u32 = 1 << 0;
    pub const POSITIONED: u32 = 1 << 1;
    pub const SOUTH: u32 = 1 << 2;
    pub const WEST: u32 = 1 << 3;
    pub const OUT_OF_SERVICE: u32 = 1 << 4;
    pub const COORDINATES_ENCRYPTED: u32 = 1 << 5;
    pub const OIL_CUT: u32 = 1 << 10;
    pub const CIRCUIT_CUT: u32 = 1 << 11;
    pub const DOOR_LOCKED: u32 = 1 << 12;
    pub const GPS: u32 = 1 << 18;
    pub const BEIDOU: u32 = 1 << 19;
    pub const GLONASS: u32 = 1 << 20;
    pub const GALILEO: u32 = 1 << 21;

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }

    pub fn acc_on(&self) -> bool {
        self.contains(Self::ACC_ON)
    }

    pub fn positioned(&self) -> bool {
        self.contains(Self::POSITIONED)
    }

    pub fn south(&self) -> bool {
        self.contains(Self::SOUTH)
    }

    pub fn west(&self) -> bool {
        self.contains(Self::WEST)
    }

    pub fn out_of_service(&self) -> bool {
        self.contains(Self::OUT_OF_SERVICE)
    }

    pub fn coordinates_encrypted(&self) -> bool {
        self.contains(Self::COORDINATES_ENCRYPTED)
    }

    pub fn gps(&self) -> bool {
        self.contains(Self::GPS)
    }

    pub fn beidou(&self) -> bool {
        self.contains(Self::BEIDOU)
    }

    pub fn glonass(&self) -> bool {
        self.contains(Self::GLONASS)
    }

    pub fn galileo(&self) -> bool {
        self.contains(Self::GALILEO)
    }
}

/// Alarm bits of the 2013 alarm word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlarmKind {
    /// A set bit with no assigned meaning (15-17), by bit position.
    Reserved(u8),
    Emergency,
    Overspeed,
    FatigueDriving,
    DangerWarning,
    GnssModuleFault,
    GnssAntennaDisconnected,
    GnssAntennaShortCircuit,
    MainPowerUndervoltage,
    MainPowerOff,
    DisplayFault,
    TtsModuleFault,
    CameraFault,
    IcCardModuleFault,
    OverspeedWarning,
    FatigueWarning,
    DailyDrivingTimeout,
    OvertimeParking,
    AreaEntryExit,
    RouteEntryExit,
    RouteDrivingTime,
    RouteDeviation,
    VssFault,
    AbnormalFuel,
    VehicleStolen,
    IllegalIgnition,
    IllegalDisplacement,
    CollisionRollover,
    RolloverWarning,
    IllegalDoorOpen,
}

impl AlarmKind {
    /// Every alarm with its bit position.
    pub const ALL: [(u8, AlarmKind); 29] = [
        (0, AlarmKind::Emergency),
        (1, AlarmKind::Overspeed),
        (2, AlarmKind::FatigueDriving),
        (3, AlarmKind::DangerWarning),
        (4, AlarmKind::GnssModuleFault),
        (5, AlarmKind::GnssAntennaDisconnected),
        (6, AlarmKind::GnssAntennaShortCircuit),
        (7, AlarmKind::MainPowerUndervoltage),
        (8, AlarmKind::MainPowerOff),
        (9, AlarmKind::DisplayFault),
        (10, AlarmKind::TtsModuleFault),
        (11, AlarmKind::CameraFault),
        (12, AlarmKind::IcCardModuleFault),
        (13, AlarmKind::OverspeedWarning),
        (14, AlarmKind::FatigueWarning),
        (18, AlarmKind::DailyDrivingTimeout),
        (19, AlarmKind::OvertimeParking),
        (20, AlarmKind::AreaEntryExit),
        (21, AlarmKind::RouteEntryExit),
        (22, AlarmKind::RouteDrivingTime),
        (23, AlarmKind::RouteDeviation),
        (24, AlarmKind::VssFault),
        (25, AlarmKind::AbnormalFuel),
        (26, AlarmKind::VehicleStolen),
        (27, AlarmKind::IllegalIgnition),
        (28, AlarmKind::IllegalDisplacement),
        (29, AlarmKind::CollisionRollover),
        (30, AlarmKind::RolloverWarning),
        (31, AlarmKind::IllegalDoorOpen),
    ];
}

/// Alarm word of a position record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlarmFlags(pub u32);

impl AlarmFlags {
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Alarms set in this word, in bit order. Set bits without a name come
    /// back as [`AlarmKind::Reserved`].
    pub fn kinds(&self) -> Vec<AlarmKind> {
        (0u8..32)
            .filter(|bit| self.0 & (1u32 << bit) != 0)
            .map(|bit| {
                AlarmKind::ALL
                    .iter()
                    .find(|(named, _)| *named == bit)
                    .map_or(AlarmKind::Reserved(bit), |(_, kind)| *kind)
            })
            .collect()
    }
}

/// Extension item (`id:u8, len:u8, value`) trailing a position core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraItem {
    pub id: u8,
    pub value: Vec<u8>,
}

/// Extension item ids with a typed accessor on [`PositionRecord`].
pub mod extra_id {
    pub const MILEAGE: u8 = 0x01;
    pub const FUEL: u8 = 0x02;
    pub const RECORDER_SPEED: u8 = 0x03;
    pub const SIGNAL_STRENGTH: u8 = 0x30;
    pub const SATELLITES: u8 = 0x31;
}

/// Kind of a 0x0704 batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchKind {
    Normal,
    /// Positions recorded while out of coverage.
    BlindAreaBackfill,
    Unknown(u8),
}

impl From<u8> for BatchKind {
    fn from(value: u8) -> Self {
        match value {
            0 => BatchKind::Normal,
            1 => BatchKind::BlindAreaBackfill,
            other => BatchKind::Unknown(other),
        }
    }
}

/// Which message carried a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSource {
    Report,
    QueryReply { ack_sequence: u16 },
    VehicleControlReply { ack_sequence: u16 },
    Batch { index: u16, kind: BatchKind },
    /// Core embedded in a media record.
    Embedded,
}

/// Position core plus extension items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub alarm: AlarmFlags,
    pub status: StatusFlags,
    /// Degrees, negative in the southern hemisphere.
    pub latitude: f64,
    /// Degrees, negative in the western hemisphere.
    pub longitude: f64,
    pub altitude_m: u16,
    pub speed_kmh: f64,
    /// Degrees clockwise from north, 0-359.
    pub heading: u16,
    /// Device-local time of the fix.
    pub time: Option<NaiveDateTime>,
    pub extras: Vec<ExtraItem>,
    pub source: PositionSource,
}

impl PositionRecord {
    /// Raw value of the first extension item with this id.
    pub fn extra(&self, id: u8) -> Option<&[u8]> {
        self.extras.iter().find(|item| item.id == id).map(|item| item.value.as_slice())
    }

    /// Odometer reading in km.
    pub fn mileage_km(&self) -> Option<f64> {
        let v: [u8; 4] = self.extra(extra_id::MILEAGE)?.try_into().ok()?;
        Some(f64::from(u32::from_be_bytes(v)) / 10.0)
    }

    /// Fuel gauge in litres.
    pub fn fuel_litres(&self) -> Option<f64> {
        let v: [u8; 2] = self.extra(extra_id::FUEL)?.try_into().ok()?;
        Some(f64::from(u16::from_be_bytes(v)) / 10.0)
    }

    /// Speed from the driving recorder in km/h.
    pub fn recorder_speed_kmh(&self) -> Option<f64> {
        let v: [u8; 2] = self.extra(extra_id::RECORDER_SPEED)?.try_into().ok()?;
        Some(f64::from(u16::from_be_bytes(v)) / 10.0)
    }

    pub fn signal_strength(&self) -> Option<u8> {
        match self.extra(extra_id::SIGNAL_STRENGTH)? {
            [v] => Some(*v),
            _ => None,
        }
    }

    pub fn satellite_count(&self) -> Option<u8> {
        match self.extra(extra_id::SATELLITES)? {
            [v] => Some(*v),
            _ => None,
        }
    }
}

/// Alarms raised by a position record. Shares the record with the
/// corresponding [`EventKind::Position`] event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub position: Arc<PositionRecord>,
    pub alarms: Vec<AlarmKind>,
}

// ── Generic results ───────────────────────────────────────────────────────────

/// Acknowledgement or result echoed back by the terminal.
///
/// | msg    | ack_sequence | ack_msg_id | code            | flag      | media_ids |
/// |--------|--------------|------------|-----------------|-----------|-----------|
/// | 0x0001 | yes          | yes        | result          |           |           |
/// | 0x0301 |              |            | event id        |           |           |
/// | 0x0302 | yes          |            | answer id       |           |           |
/// | 0x0303 |              |            | info type       | 1 = on    |           |
/// | 0x0805 | yes          |            | result          |           | yes       |
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultRecord {
    pub ack_sequence: Option<u16>,
    pub ack_msg_id: Option<u16>,
    pub code: u8,
    pub flag: Option<u8>,
    pub media_ids: Vec<u32>,
}

// ── Driver identity ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IcCardStatus {
    Inserted,
    Ejected,
    Unknown(u8),
}

impl From<u8> for IcCardStatus {
    fn from(value: u8) -> Self {
        match value {
            1 => IcCardStatus::Inserted,
            2 => IcCardStatus::Ejected,
            other => IcCardStatus::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IcReadResult {
    Success,
    KeyAuthenticationFailed,
    CardLocked,
    CardRemoved,
    ChecksumError,
    Unknown(u8),
}

impl From<u8> for IcReadResult {
    fn from(value: u8) -> Self {
        match value {
            0 => IcReadResult::Success,
            1 => IcReadResult::KeyAuthenticationFailed,
            2 => IcReadResult::CardLocked,
            3 => IcReadResult::CardRemoved,
            4 => IcReadResult::ChecksumError,
            other => IcReadResult::Unknown(other),
        }
    }
}

/// DRIVER IDENTITY REPORT (0x0702).
///
/// Only an inserted card carries a read result, and only a successful read
/// carries the licence fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverIdentity {
    pub status: IcCardStatus,
    pub time: Option<NaiveDateTime>,
    pub read_result: Option<IcReadResult>,
    pub name: Option<String>,
    pub certificate_code: Option<String>,
    pub issuing_authority: Option<String>,
    pub certificate_expiry: Option<NaiveDate>,
}

// ── Multimedia ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Image,
    Audio,
    Video,
    Unknown(u8),
}

impl From<u8> for MediaType {
    fn from(value: u8) -> Self {
        match value {
            0 => MediaType::Image,
            1 => MediaType::Audio,
            2 => MediaType::Video,
            other => MediaType::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaFormat {
    Jpeg,
    Tif,
    Mp3,
    Wav,
    Wmv,
    Unknown(u8),
}

impl From<u8> for MediaFormat {
    fn from(value: u8) -> Self {
        match value {
            0 => MediaFormat::Jpeg,
            1 => MediaFormat::Tif,
            2 => MediaFormat::Mp3,
            3 => MediaFormat::Wav,
            4 => MediaFormat::Wmv,
            other => MediaFormat::Unknown(other),
        }
    }
}

/// What triggered a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaEventCode {
    PlatformCommand,
    TimedAction,
    RobberyAlarm,
    CollisionRollover,
    DoorOpened,
    DoorClosed,
    /// Door went from open to closed while speed rose past 20 km/h.
    DoorClosedMoving,
    FixedDistance,
    Unknown(u8),
}

impl From<u8> for MediaEventCode {
    fn from(value: u8) -> Self {
        match value {
            0 => MediaEventCode::PlatformCommand,
            1 => MediaEventCode::TimedAction,
            2 => MediaEventCode::RobberyAlarm,
            3 => MediaEventCode::CollisionRollover,
            4 => MediaEventCode::DoorOpened,
            5 => MediaEventCode::DoorClosed,
            6 => MediaEventCode::DoorClosedMoving,
            7 => MediaEventCode::FixedDistance,
            other => MediaEventCode::Unknown(other),
        }
    }
}

/// Fixed fields shared by 0x0800 and the first packet of 0x0801.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub media_id: u32,
    pub media_type: MediaType,
    pub format: MediaFormat,
    pub event_code: MediaEventCode,
    pub channel_id: u8,
}

/// MEDIA EVENT (0x0800) or one packet of MEDIA UPLOAD (0x0801).
///
/// Packets after the first carry only `data`; chunks are not reassembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub descriptor: Option<MediaDescriptor>,
    pub position: Option<PositionRecord>,
    pub data: Vec<u8>,
    pub sub_packet: Option<SubPacket>,
}

/// One entry of a stored-media search reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMedia {
    pub media_id: u32,
    pub media_type: MediaType,
    pub channel_id: u8,
    pub event_code: MediaEventCode,
    pub position: PositionRecord,
}

/// STORED MEDIA SEARCH REPLY (0x0802).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaQueryResult {
    pub ack_sequence: u16,
    pub items: Vec<StoredMedia>,
}

// ── RSA ───────────────────────────────────────────────────────────────────────

/// TERMINAL RSA PUBLIC KEY (0x0A00).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaPublicKey {
    pub e: u32,
    /// 128-byte big-endian modulus.
    pub n: Vec<u8>,
}
