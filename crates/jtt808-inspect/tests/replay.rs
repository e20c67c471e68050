//! Replays whole captures through the library surface the binary uses.

use jtt808_core::protocol::messages::msg_id;
use jtt808_core::{FrameBuilder, ProcessSummary};
use jtt808_inspect::app::{run, select_parser};
use jtt808_inspect::capture::{decode_capture, read_input, CaptureFormat};
use jtt808_inspect::config::InspectConfig;

fn position_body(lat: i32, status: u32) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&status.to_be_bytes());
    body.extend_from_slice(&lat.to_be_bytes());
    body.extend_from_slice(&116_397_128i32.to_be_bytes());
    body.extend_from_slice(&44u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&[0x24, 0x01, 0x01, 0x00, 0x00, 0x00]);
    body
}

fn replay(config: &InspectConfig, capture: &[u8]) -> (ProcessSummary, Vec<serde_json::Value>) {
    let parser = select_parser(&config.codec).unwrap();
    let mut out = Vec::new();
    let summary = run(parser.as_ref(), capture, &config.output, &mut out).unwrap();
    let records = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (summary, records)
}

#[test]
fn test_hex_capture_file_replays() {
    let heartbeat = FrameBuilder::new(msg_id::HEARTBEAT, "012345678901", 1).finish().unwrap();
    let position = FrameBuilder::new(msg_id::POSITION_REPORT, "012345678901", 2)
        .body(&position_body(39_909_187, 0))
        .finish()
        .unwrap();
    let text = format!(
        "# two frames from one terminal\n{}\n{} # position\n",
        hex::encode(&heartbeat),
        hex::encode_upper(&position)
    );

    let path = std::env::temp_dir().join(format!("jtt808-inspect-{}.hex", std::process::id()));
    std::fs::write(&path, text).unwrap();
    let content = read_input(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let capture = decode_capture(&content, CaptureFormat::Auto).unwrap();
    let (summary, records) = replay(&InspectConfig::default(), &capture);
    assert_eq!(summary, ProcessSummary { frames: 2, events: 2, failed: 0 });
    assert_eq!(records[0]["kind"]["type"], "Heartbeat");
    assert_eq!(records[1]["kind"]["type"], "Position");
    assert_eq!(records[1]["kind"]["latitude"], 39.909187);
    assert_eq!(records[1]["meta"]["device_id"], "012345678901");
}

#[test]
fn test_config_drives_chunking_and_responses() {
    let config = InspectConfig::from_toml_str(
        r#"
        [output]
        chunk_size = 5
        emit_responses = true
        "#,
    )
    .unwrap();

    let mut register = vec![0x00, 0x2C, 0x01, 0x2C];
    register.extend_from_slice(b"ACME\0");
    register.extend_from_slice(&[b'M'; 20]);
    register.extend_from_slice(b"T000001");
    register.push(1);
    register.extend_from_slice("京A12345".as_bytes());
    let capture = FrameBuilder::new(msg_id::REGISTER, "013912345678", 3)
        .body(&register)
        .finish()
        .unwrap();

    let (summary, records) = replay(&config, &capture);
    assert_eq!(summary.events, 1);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["kind"]["type"], "Register");
    assert_eq!(records[1]["record"], "response");
    assert!(records[1]["hex"].as_str().unwrap().starts_with("7E8100"));
}

#[test]
fn test_small_buffer_limit_discards_garbage() {
    let config = InspectConfig::from_toml_str("[codec]\nmax_buffered_bytes = 64\n[output]\nchunk_size = 100").unwrap();
    let mut capture = vec![0x11u8; 100];
    capture.extend_from_slice(&FrameBuilder::new(msg_id::HEARTBEAT, "1", 1).finish().unwrap());

    let (summary, records) = replay(&config, &capture);
    assert_eq!(summary.frames, 1);
    assert_eq!(records.len(), 1);
}
