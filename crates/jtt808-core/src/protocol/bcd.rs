//! Binary-coded decimal helpers.
//!
//! Each nibble holds one decimal digit. Terminals occasionally put
//! non-decimal nibbles in identifier fields; those render as upper-case hex
//! digits so the string keeps its fixed width.

use chrono::{NaiveDate, NaiveDateTime};

/// Renders every byte as two digits, most significant nibble first.
///
/// ```rust
/// use jtt808_core::protocol::bcd::decode_digits;
///
/// assert_eq!(decode_digits(&[0x01, 0x23, 0x45, 0x67, 0x89, 0x01]), "012345678901");
/// ```
pub fn decode_digits(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(nibble_char(byte >> 4));
        out.push(nibble_char(byte & 0x0F));
    }
    out
}

fn nibble_char(nibble: u8) -> char {
    // nibble is always < 16
    char::from_digit(u32::from(nibble), 16)
        .unwrap_or('0')
        .to_ascii_uppercase()
}

/// Value of a single BCD byte, or `None` if either nibble is not decimal.
pub fn byte_value(byte: u8) -> Option<u32> {
    let (high, low) = (byte >> 4, byte & 0x0F);
    if high > 9 || low > 9 {
        return None;
    }
    Some(u32::from(high) * 10 + u32::from(low))
}

/// Packs a string of decimal digits into BCD, left-padding with zeros to
/// `width` bytes. Returns `None` for non-digit input or if it does not fit.
pub fn encode_digits(digits: &str, width: usize) -> Option<Vec<u8>> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) || digits.len() > width * 2 {
        return None;
    }
    let padded = format!("{digits:0>len$}", len = width * 2);
    let nibbles = padded.as_bytes();
    Some(
        nibbles
            .chunks(2)
            .map(|pair| ((pair[0] - b'0') << 4) | (pair[1] - b'0'))
            .collect(),
    )
}

/// Decodes the 6-byte `YY MM DD hh mm ss` device timestamp (years 2000-2099).
///
/// Returns `None` when a nibble is not decimal or the value is not a real
/// calendar date and time (terminals without a fix often send all zeros).
pub fn decode_datetime(bytes: &[u8; 6]) -> Option<NaiveDateTime> {
    let mut parts = [0u32; 6];
    for (slot, &byte) in parts.iter_mut().zip(bytes.iter()) {
        *slot = byte_value(byte)?;
    }
    let [yy, month, day, hour, minute, second] = parts;
    NaiveDate::from_ymd_opt(2000 + yy as i32, month, day)?.and_hms_opt(hour, minute, second)
}

/// Decodes the 4-byte `YYYY MM DD` date-only field used by driver licences.
pub fn decode_date(bytes: &[u8; 4]) -> Option<NaiveDate> {
    let century = byte_value(bytes[0])?;
    let year = byte_value(bytes[1])?;
    let month = byte_value(bytes[2])?;
    let day = byte_value(bytes[3])?;
    NaiveDate::from_ymd_opt((century * 100 + year) as i32, month, day)
}
