//! A persistent, self-validating event log for small byte-addressable EEPROMs.
//!
//! The log is a ring of fixed 64-byte slots starting at a base address. Every slot holds
//! one NUL-terminated message followed by a big-endian CRC-16, so a record torn by a power
//! loss between two byte writes is recognised on the next read instead of being trusted.
//!
//! Layering, leaves first:
//! - [ByteStore]: single byte read/write primitives ([MemoryStore], [I2cEeprom])
//! - [crc16]: CRC-16/CCITT-FALSE
//! - [record]: slot encoding and validation
//! - [CircularLog]: append with wrap-around erase, read-back, erase
//! - [StateEventLogger]: turns application state changes into log lines
//!
//! Next to the log, [FlagStore] keeps boolean application state in inverted-pair form and
//! [Debouncer] filters sampled button levels into single press events.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod crc;
pub mod debounce;
pub mod eeprom;
pub mod error;
pub mod events;
pub mod flags;
pub mod log;
pub mod record;
pub mod store;


pub use crc::crc16;
pub use debounce::Debouncer;
pub use eeprom::{EepromConfig, I2cEeprom};
pub use error::{ConfigError, InvalidSlot, LogError};
pub use events::{StateChange, StateEventLogger};
pub use flags::FlagStore;
pub use log::{CircularLog, Entries, LogConfig};
pub use record::{LogEntry, MAX_PAYLOAD, SLOT_SIZE};
pub use store::{ByteStore, MemoryError, MemoryStore};
