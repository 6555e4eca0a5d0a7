//! Byte-level access to the persistent memory.
//!
//! A store only promises single-byte atomicity. A sequence of writes may stop after any
//! prefix (power loss, bus fault), which is why everything above this layer validates
//! what it reads back.

use core::fmt::Debug;

use thiserror::Error;

/// Byte-addressable persistent memory such as an I2C EEPROM.
///
/// `write_byte` returns once the device has committed the byte, i.e. after any settle
/// delay the device needs. Implementations are blocking and expect a single writer.
pub trait ByteStore {
    type Error: Debug;

    fn read_byte(&mut self, address: u16) -> Result<u8, Self::Error>;

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), Self::Error>;

    /// Fills `buf` with the bytes starting at `address`.
    fn read_bytes(&mut self, address: u16, buf: &mut [u8]) -> Result<(), Self::Error> {
        let mut addr = address;
        for byte in buf.iter_mut() {
            *byte = self.read_byte(addr)?;
            addr = addr.wrapping_add(1);
        }
        Ok(())
    }

    /// Number of addressable bytes.
    fn capacity(&self) -> u32;
}

/// Errors of [MemoryStore], mostly injected on purpose.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryError {
    #[error("address {0:#06x} is outside the memory")]
    OutOfRange(u16),

    #[error("write to {0:#06x} lost")]
    WriteFault(u16),

    #[error("read from {0:#06x} failed")]
    ReadFault(u16),
}

/// RAM-backed store of `N` bytes.
///
/// Starts filled with `0xFF` like a factory-fresh EEPROM. Faults can be injected to model
/// a power cut after a number of committed writes or a dead bus.
#[derive(Clone)]
pub struct MemoryStore<const N: usize> {
    cells: [u8; N],
    writes: usize,
    write_budget: Option<usize>,
    read_fault: bool,
}

impl<const N: usize> MemoryStore<N> {
    pub const fn new() -> Self {
        Self::filled(0xFF)
    }

    pub const fn filled(value: u8) -> Self {
        MemoryStore {
            cells: [value; N],
            writes: 0,
            write_budget: None,
            read_fault: false,
        }
    }

    /// Lets `count` more writes succeed, every later write fails without touching memory.
    /// `None` removes the limit.
    pub fn cut_power_after(&mut self, count: Option<usize>) {
        self.write_budget = count;
    }

    /// Makes every read fail until switched off again.
    pub fn fail_reads(&mut self, fail: bool) {
        self.read_fault = fail;
    }

    /// Committed writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Direct access, bypassing fault injection. Used to plant corrupt data.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    fn index(&self, address: u16) -> Result<usize, MemoryError> {
        let index = usize::from(address);
        if index < N {
            Ok(index)
        } else {
            Err(MemoryError::OutOfRange(address))
        }
    }
}

impl<const N: usize> Default for MemoryStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteStore for MemoryStore<N> {
    type Error = MemoryError;

    fn read_byte(&mut self, address: u16) -> Result<u8, Self::Error> {
        let index = self.index(address)?;
        if self.read_fault {
            return Err(MemoryError::ReadFault(address));
        }
        Ok(self.cells[index])
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), Self::Error> {
        let index = self.index(address)?;
        if let Some(budget) = self.write_budget.as_mut() {
            if *budget == 0 {
                return Err(MemoryError::WriteFault(address));
            }
            *budget -= 1;
        }
        self.cells[index] = value;
        self.writes += 1;
        Ok(())
    }

    fn capacity(&self) -> u32 {
        N as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_memory_reads_erased_pattern() {
        let mut mem = MemoryStore::<16>::new();
        assert_eq!(mem.read_byte(0), Ok(0xFF));
        assert_eq!(mem.read_byte(15), Ok(0xFF));
        assert_eq!(mem.capacity(), 16);
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut mem = MemoryStore::<16>::new();
        assert_eq!(mem.read_byte(16), Err(MemoryError::OutOfRange(16)));
        assert_eq!(mem.write_byte(100, 1), Err(MemoryError::OutOfRange(100)));
    }

    #[test]
    fn default_block_read_walks_addresses() {
        let mut mem = MemoryStore::<8>::filled(0);
        for (addr, value) in [(2u16, 0xA1u8), (3, 0xB2), (4, 0xC3)] {
            mem.write_byte(addr, value).unwrap();
        }
        let mut buf = [0u8; 3];
        mem.read_bytes(2, &mut buf).unwrap();
        assert_eq!(buf, [0xA1, 0xB2, 0xC3]);
    }

    #[test]
    fn power_cut_drops_writes_after_budget() {
        let mut mem = MemoryStore::<8>::filled(0);
        mem.cut_power_after(Some(2));
        assert!(mem.write_byte(0, 1).is_ok());
        assert!(mem.write_byte(1, 2).is_ok());
        assert_eq!(mem.write_byte(2, 3), Err(MemoryError::WriteFault(2)));
        assert_eq!(mem.as_bytes()[..3], [1, 2, 0]);
        assert_eq!(mem.write_count(), 2);

        mem.cut_power_after(None);
        assert!(mem.write_byte(2, 3).is_ok());
    }

    #[test]
    fn read_fault_is_reported() {
        let mut mem = MemoryStore::<8>::new();
        mem.fail_reads(true);
        assert_eq!(mem.read_byte(3), Err(MemoryError::ReadFault(3)));
        mem.fail_reads(false);
        assert_eq!(mem.read_byte(3), Ok(0xFF));
    }
}
