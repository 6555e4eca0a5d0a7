//! Encoding of one log record into a fixed slot.
//!
//! ```text
//! ┌──────────────────┬─────┬─────────┬──────────────┐
//! │ payload (1..=61) │ NUL │ CRC (BE)│ unused       │
//! └──────────────────┴─────┴─────────┴──────────────┘
//!  0                  n     n+1 n+2   n+3 .. 64
//! ```
//! The CRC covers payload and terminator. A slot whose first byte is zero is erased;
//! unused trailing bytes keep whatever was there before and are never inspected.

use core::fmt;
use core::ops::Deref;

use heapless::{String, Vec};

use crate::crc::crc16;
use crate::error::{InvalidSlot, LogError};

/// Bytes reserved for each record.
pub const SLOT_SIZE: usize = 64;
/// Longest payload, leaving room for terminator and CRC.
pub const MAX_PAYLOAD: usize = SLOT_SIZE - RECORD_OVERHEAD;
/// Terminator plus two CRC bytes.
pub const RECORD_OVERHEAD: usize = 3;

/// Encoded record, `payload + NUL + CRC`, at most [SLOT_SIZE] bytes.
pub type EncodedRecord = Vec<u8, SLOT_SIZE>;

/// Message read back from a valid slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry(String<MAX_PAYLOAD>);

impl LogEntry {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for LogEntry {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for LogEntry {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for LogEntry {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Longest prefix of `message` that fits a slot without splitting a character.
pub fn truncate(message: &str) -> &str {
    if message.len() <= MAX_PAYLOAD {
        return message;
    }
    let mut end = MAX_PAYLOAD;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

/// Builds the slot image for `message`, truncated to [MAX_PAYLOAD] bytes.
pub fn encode<E>(message: &str) -> Result<EncodedRecord, LogError<E>> {
    if message.is_empty() {
        return Err(LogError::EmptyMessage);
    }
    let payload = truncate(message).as_bytes();
    if let Some(pos) = payload.iter().position(|&b| b == 0) {
        return Err(LogError::InteriorNul(pos));
    }

    let mut record = EncodedRecord::new();
    // capacity is SLOT_SIZE and payload is at most MAX_PAYLOAD, these cannot overflow
    let _ = record.extend_from_slice(payload);
    let _ = record.push(0);
    let crc = crc16(&record);
    let _ = record.extend_from_slice(&crc.to_be_bytes());
    Ok(record)
}

/// Validates a slot image and returns its message.
pub fn decode(slot: &[u8; SLOT_SIZE]) -> Result<LogEntry, InvalidSlot> {
    if slot[0] == 0 {
        return Err(InvalidSlot::Erased);
    }
    let term = slot[1..=MAX_PAYLOAD]
        .iter()
        .position(|&b| b == 0)
        .map(|pos| pos + 1)
        .ok_or(InvalidSlot::MissingTerminator)?;

    let stored = u16::from_be_bytes([slot[term + 1], slot[term + 2]]);
    let computed = crc16(&slot[..=term]);
    if stored != computed {
        return Err(InvalidSlot::CrcMismatch { stored, computed });
    }

    let text = core::str::from_utf8(&slot[..term]).map_err(|_| InvalidSlot::NotUtf8)?;
    let mut entry = String::new();
    // the terminator sits at most MAX_PAYLOAD bytes in, so the text always fits
    let _ = entry.push_str(text);
    Ok(LogEntry(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    type Error = LogError<()>;

    fn slot_of(record: &[u8], fill: u8) -> [u8; SLOT_SIZE] {
        let mut slot = [fill; SLOT_SIZE];
        slot[..record.len()].copy_from_slice(record);
        slot
    }

    #[test]
    fn encode_layout() {
        let record = encode::<()>("Boot").unwrap();
        assert_eq!(record.len(), 4 + RECORD_OVERHEAD);
        assert_eq!(&record[..5], b"Boot\0");
        assert_eq!(&record[5..], &[0xBA, 0x1C]);
    }

    #[test]
    fn longest_payload_decodes_whole() {
        let message = format!("{}é", "a".repeat(MAX_PAYLOAD - 2));
        let slot = slot_of(&encode::<()>(&message).unwrap(), 0xFF);
        let entry = decode(&slot).unwrap();
        assert_eq!(entry.len(), MAX_PAYLOAD);
        assert_eq!(entry, message.as_str());
    }

    #[test]
    fn empty_message_is_rejected() {
        assert_eq!(encode::<()>(""), Err(Error::EmptyMessage));
    }

    #[test]
    fn interior_nul_is_rejected() {
        assert_eq!(encode::<()>("ab\0cd"), Err(Error::InteriorNul(2)));
    }

    #[test]
    fn nul_past_the_cut_is_ignored() {
        let mut message = "x".repeat(MAX_PAYLOAD);
        message.push('\0');
        let record = encode::<()>(&message).unwrap();
        assert_eq!(record.len(), SLOT_SIZE);
    }

    #[test]
    fn full_length_record_fills_slot() {
        let message = "m".repeat(MAX_PAYLOAD);
        let record = encode::<()>(&message).unwrap();
        assert_eq!(record.len(), SLOT_SIZE);
        let entry = decode(&slot_of(&record, 0xFF)).unwrap();
        assert_eq!(entry.len(), MAX_PAYLOAD);
    }

    #[test]
    fn truncation_keeps_characters_whole() {
        // 60 ascii bytes then a two byte character straddling the limit
        let message = format!("{}é", "a".repeat(60));
        assert_eq!(truncate(&message).len(), 60);
        let record = encode::<()>(&message).unwrap();
        let entry = decode(&slot_of(&record, 0xFF)).unwrap();
        assert_eq!(entry, "a".repeat(60).as_str());
    }

    #[test]
    fn erased_slot_is_invalid() {
        let mut slot = slot_of(&encode::<()>("D1: on").unwrap(), 0xFF);
        slot[0] = 0;
        assert_eq!(decode(&slot), Err(InvalidSlot::Erased));
    }

    #[test]
    fn factory_fresh_slot_is_invalid() {
        assert_eq!(decode(&[0xFF; SLOT_SIZE]), Err(InvalidSlot::MissingTerminator));
    }

    #[test]
    fn terminator_at_index_62_is_too_late() {
        let mut slot = [b'z'; SLOT_SIZE];
        slot[62] = 0;
        assert_eq!(decode(&slot), Err(InvalidSlot::MissingTerminator));
    }

    #[test]
    fn corrupted_crc_is_detected() {
        let mut slot = slot_of(&encode::<()>("D2: off").unwrap(), 0);
        slot[9] ^= 0x01;
        assert!(matches!(decode(&slot), Err(InvalidSlot::CrcMismatch { .. })));
    }

    #[test]
    fn valid_crc_over_invalid_utf8_is_rejected() {
        let mut slot = [0u8; SLOT_SIZE];
        slot[0] = 0xC3;
        let crc = crc16(&slot[..2]);
        slot[2..4].copy_from_slice(&crc.to_be_bytes());
        assert_eq!(decode(&slot), Err(InvalidSlot::NotUtf8));
    }

    proptest! {
        #[test]
        fn roundtrip_short_messages(message in "[ -~]{1,61}") {
            let record = encode::<()>(&message).unwrap();
            prop_assert_eq!(record.len(), message.len() + RECORD_OVERHEAD);
            let entry = decode(&slot_of(&record, 0xFF)).unwrap();
            prop_assert_eq!(entry.as_str(), message.as_str());
        }

        #[test]
        fn long_messages_are_truncated(message in "[ -~]{62,200}") {
            let record = encode::<()>(&message).unwrap();
            let entry = decode(&slot_of(&record, 0)).unwrap();
            prop_assert_eq!(entry.as_str(), &message[..MAX_PAYLOAD]);
        }

        #[test]
        fn single_bit_flip_in_record_is_detected(
            message in "[ -~]{1,61}",
            bit in 0usize..(SLOT_SIZE * 8),
        ) {
            let record = encode::<()>(&message).unwrap();
            prop_assume!(bit / 8 < record.len());
            let mut slot = slot_of(&record, 0xFF);
            slot[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(decode(&slot).is_err());
        }
    }
}
