//! [ByteStore] for 24xx-series I2C EEPROMs with two-byte memory addressing.
//!
//! A write is `[addr_hi, addr_lo, data]` followed by the settle delay, a read sets the
//! memory pointer with a write and reads back in the same transaction.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::store::ByteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EepromConfig {
    /// 7 bit bus address, 0x50 with all address pins low
    pub device_address: u8,
    /// size in bytes, 32 KiB for a 24C256
    pub capacity: u32,
    /// wait after every byte write until the cell is programmed
    pub settle_ms: u32,
}

impl Default for EepromConfig {
    fn default() -> Self {
        EepromConfig {
            device_address: 0x50,
            capacity: 32 * 1024,
            settle_ms: 10,
        }
    }
}

pub struct I2cEeprom<I2C, D> {
    i2c: I2C,
    delay: D,
    config: EepromConfig,
}

impl<I2C, D> I2cEeprom<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, config: EepromConfig) -> Self {
        I2cEeprom { i2c, delay, config }
    }

    pub fn config(&self) -> &EepromConfig {
        &self.config
    }

    /// Returns bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C, D> ByteStore for I2cEeprom<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = I2C::Error;

    fn read_byte(&mut self, address: u16) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_bytes(address, &mut buf)?;
        Ok(buf[0])
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), Self::Error> {
        let [hi, lo] = address.to_be_bytes();
        self.i2c.write(self.config.device_address, &[hi, lo, value])?;
        self.delay.delay_ms(self.config.settle_ms);
        Ok(())
    }

    /// Sequential read, the device auto-increments its memory pointer.
    fn read_bytes(&mut self, address: u16, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c
            .write_read(self.config.device_address, &address.to_be_bytes(), buf)
    }

    fn capacity(&self) -> u32 {
        self.config.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    /// Models a 24C256 on the bus: the first two written bytes set the memory pointer.
    struct FakeEeprom {
        address: u8,
        cells: Vec<u8>,
        pointer: usize,
        nack: bool,
        writes: Vec<(u16, u8)>,
    }

    impl FakeEeprom {
        fn new(size: usize) -> Self {
            FakeEeprom {
                address: 0x50,
                cells: vec![0xFF; size],
                pointer: 0,
                nack: false,
                writes: Vec::new(),
            }
        }
    }

    impl ErrorType for FakeEeprom {
        type Error = ErrorKind;
    }

    impl I2c for FakeEeprom {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.nack || address != self.address {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        let (addr, data) = bytes.split_at(2);
                        self.pointer = usize::from(u16::from_be_bytes([addr[0], addr[1]]));
                        for &b in data {
                            self.writes.push((self.pointer as u16, b));
                            self.cells[self.pointer] = b;
                            self.pointer = (self.pointer + 1) % self.cells.len();
                        }
                    }
                    Operation::Read(buf) => {
                        for b in buf.iter_mut() {
                            *b = self.cells[self.pointer];
                            self.pointer = (self.pointer + 1) % self.cells.len();
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_ns: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn eeprom() -> I2cEeprom<FakeEeprom, CountingDelay> {
        I2cEeprom::new(
            FakeEeprom::new(32 * 1024),
            CountingDelay::default(),
            EepromConfig::default(),
        )
    }

    #[test]
    fn write_sends_big_endian_address_and_settles() {
        let mut ee = eeprom();
        ee.write_byte(0x7FFE, 0x5A).unwrap();
        ee.write_byte(0x0102, 0xA5).unwrap();

        let (bus, delay) = ee.release();
        assert_eq!(bus.writes, vec![(0x7FFE, 0x5A), (0x0102, 0xA5)]);
        assert_eq!(delay.total_ns, 2 * 10 * 1_000_000);
    }

    #[test]
    fn sequential_read_returns_consecutive_bytes() {
        let mut ee = eeprom();
        for (i, b) in b"Boot".iter().enumerate() {
            ee.write_byte(64 + i as u16, *b).unwrap();
        }
        let mut buf = [0u8; 4];
        ee.read_bytes(64, &mut buf).unwrap();
        assert_eq!(&buf, b"Boot");
        assert_eq!(ee.read_byte(66).unwrap(), b'o');
        assert_eq!(ee.read_byte(68).unwrap(), 0xFF);
    }

    #[test]
    fn bus_errors_are_passed_through() {
        let mut ee = eeprom();
        ee.i2c.nack = true;
        assert_eq!(
            ee.write_byte(0, 1),
            Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
        );
        assert!(ee.read_byte(0).is_err());
    }

    #[test]
    fn wrong_device_address_is_not_acknowledged() {
        let config = EepromConfig {
            device_address: 0x51,
            ..EepromConfig::default()
        };
        let mut ee = I2cEeprom::new(FakeEeprom::new(64), CountingDelay::default(), config);
        assert!(ee.write_byte(0, 1).is_err());
        assert_eq!(ee.capacity(), 32 * 1024);
    }
}
