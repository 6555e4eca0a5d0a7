//! Ring of fixed-size slots on top of a [ByteStore].
//!
//! The write cursor is the first unused slot. When it runs past the last slot the whole
//! log is erased and writing restarts at slot 0, so after a wrap only the newest entry is
//! readable. Erasing clears just the first byte of each slot.
//!
//! A slot is written in three steps: clear its first byte if set, write bytes `1..len`,
//! then write the first byte. Until that last write lands the slot reads as erased, so an
//! interrupted append can neither produce a torn record nor revive an older one whose
//! tail is still in place.

use crate::error::{ConfigError, LogError};
use crate::record::{self, LogEntry, SLOT_SIZE};
use crate::store::ByteStore;

/// Slots reserved by default, 2 KiB in total.
pub const DEFAULT_MAX_ENTRIES: u16 = 32;

/// Placement of the log in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogConfig {
    base_address: u16,
    max_entries: u16,
}

impl LogConfig {
    pub const fn new(base_address: u16, max_entries: u16) -> Result<Self, ConfigError> {
        if max_entries == 0 {
            return Err(ConfigError::NoSlots);
        }
        let end = base_address as u32 + max_entries as u32 * SLOT_SIZE as u32;
        if end > u16::MAX as u32 + 1 {
            return Err(ConfigError::RegionTooLarge);
        }
        Ok(LogConfig {
            base_address,
            max_entries,
        })
    }

    pub const fn base_address(&self) -> u16 {
        self.base_address
    }

    pub const fn max_entries(&self) -> u16 {
        self.max_entries
    }

    /// First address of `slot`.
    pub const fn slot_address(&self, slot: u16) -> u16 {
        self.base_address + slot * SLOT_SIZE as u16
    }

    /// Bytes covered by the log.
    pub const fn region_len(&self) -> u32 {
        self.max_entries as u32 * SLOT_SIZE as u32
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            base_address: 0,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

pub struct CircularLog<S> {
    store: S,
    config: LogConfig,
    next_slot: u16,
}

impl<S: ByteStore> CircularLog<S> {
    /// Takes over `store` with the cursor at slot 0. Call [CircularLog::recover] to resume
    /// after the entries already on the device instead.
    ///
    /// Fails if the region of `config` does not lie within the capacity of `store`.
    pub fn new(store: S, config: LogConfig) -> Result<Self, ConfigError> {
        let end = u32::from(config.base_address) + config.region_len();
        if end > store.capacity() {
            return Err(ConfigError::RegionOutsideStore);
        }
        Ok(CircularLog {
            store,
            config,
            next_slot: 0,
        })
    }

    /// Moves the cursor to the first invalid slot, so a restart appends after the surviving
    /// entries. Returns the new cursor. A full log leaves the cursor at the end and the next
    /// append wraps.
    pub fn recover(&mut self) -> Result<u16, LogError<S::Error>> {
        let mut valid = 0;
        for entry in self.entries() {
            entry?;
            valid += 1;
        }
        self.next_slot = valid;
        info!("log cursor recovered at slot {}", valid);
        Ok(valid)
    }

    /// Stores `message` in the next free slot and returns the slot index.
    ///
    /// Messages longer than [record::MAX_PAYLOAD] bytes are truncated. Invalid input
    /// is rejected before the store is touched. On a store error the cursor stays put and
    /// the slot reads as erased.
    pub fn append(&mut self, message: &str) -> Result<u16, LogError<S::Error>> {
        let record = record::encode::<S::Error>(message)?;

        if self.next_slot >= self.config.max_entries {
            debug!("log full, erasing {} slots", self.config.max_entries);
            self.erase_all()?;
        }

        let slot = self.next_slot;
        let base = self.config.slot_address(slot);

        if self.read(base)? != 0 {
            self.write(base, 0)?;
        }
        for (offset, &byte) in record.iter().enumerate().skip(1) {
            self.write(base + offset as u16, byte)?;
        }
        self.write(base, record[0])?;

        trace!("appended {} bytes to slot {}", record.len(), slot);
        self.next_slot = slot + 1;
        Ok(slot)
    }

    /// Valid entries from slot 0 up to the first invalid slot.
    pub fn entries(&mut self) -> Entries<'_, S> {
        Entries {
            store: &mut self.store,
            config: self.config,
            slot: 0,
            done: false,
        }
    }

    /// Marks every slot erased and resets the cursor.
    pub fn erase_all(&mut self) -> Result<(), LogError<S::Error>> {
        for slot in 0..self.config.max_entries {
            self.write(self.config.slot_address(slot), 0)?;
        }
        self.next_slot = 0;
        Ok(())
    }

    /// Slot the next append writes to, equal to `max_entries` when the log is full.
    pub fn next_slot(&self) -> u16 {
        self.next_slot
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Access to the store outside the log region.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn read(&mut self, address: u16) -> Result<u8, LogError<S::Error>> {
        self.store
            .read_byte(address)
            .map_err(|cause| LogError::Store { address, cause })
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), LogError<S::Error>> {
        self.store.write_byte(address, value).map_err(|cause| {
            warn!("store write failed at {=u16:#x}", address);
            LogError::Store { address, cause }
        })
    }
}

/// Iterator returned by [CircularLog::entries].
///
/// Yields each valid entry in slot order, ends at the first invalid slot or the end of the
/// log. A store error is yielded once and ends the iteration.
pub struct Entries<'a, S> {
    store: &'a mut S,
    config: LogConfig,
    slot: u16,
    done: bool,
}

impl<S: ByteStore> Iterator for Entries<'_, S> {
    type Item = Result<LogEntry, LogError<S::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.slot >= self.config.max_entries {
            return None;
        }

        let address = self.config.slot_address(self.slot);
        let mut buf = [0u8; SLOT_SIZE];
        if let Err(cause) = self.store.read_bytes(address, &mut buf) {
            self.done = true;
            return Some(Err(LogError::Store { address, cause }));
        }

        match record::decode(&buf) {
            Ok(entry) => {
                self.slot += 1;
                Some(Ok(entry))
            }
            Err(reason) => {
                trace!("slot {} invalid: {}", self.slot, reason);
                self.done = true;
                None
            }
        }
    }
}
