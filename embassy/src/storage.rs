//! Everything that lives in the EEPROM: the event log in the first 2 KiB and the LED
//! states in inverted pairs at the highest addresses.
//!
//! Only the command executor holds a [Storage], so there is exactly one writer. Every call
//! blocks until the EEPROM has settled; a hung bus blocks the executor with it.

use cortex_m_semihosting::{hprint, hprintln};

use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Blocking;
use embassy_time::Delay;

use eelog::{
    CircularLog, ConfigError, EepromConfig, FlagStore, I2cEeprom, LogConfig, StateChange,
    StateEventLogger,
};

use crate::console::HostConsole;
use crate::led::LED_NAMES;

pub const LED_COUNT: usize = LED_NAMES.len();

/// Used when the EEPROM holds no valid LED state: middle LED on, the others off
pub const DEFAULT_LEDS: [bool; LED_COUNT] = [false, true, false];

pub type BoardEeprom = I2cEeprom<I2c<'static, Blocking>, Delay>;
pub type BoardLogger = StateEventLogger<BoardEeprom, HostConsole>;

pub struct Storage {
    logger: BoardLogger,
    flags: FlagStore,
}

impl Storage {
    /// Takes the EEPROM over, resumes the log after the entries already stored and
    /// writes the boot marker. Fails before touching the device if log and LED states
    /// do not both fit without overlapping.
    pub fn open(i2c: I2c<'static, Blocking>) -> Result<Self, ConfigError> {
        let eeprom = I2cEeprom::new(i2c, Delay, EepromConfig::default());
        let flags = FlagStore::at_top_of(&eeprom, LED_COUNT as u16)?;

        let mut log = CircularLog::new(eeprom, LogConfig::default())?;
        if flags.overlaps(log.config()) {
            return Err(ConfigError::FlagsOverlapLog);
        }
        match log.recover() {
            Ok(slot) => defmt::info!("log resumes at slot {}", slot),
            Err(err) => hprintln!("Scanning the log failed ({}), writing from slot 0", err),
        }

        let mut logger = StateEventLogger::new(log, HostConsole);
        logger.boot();
        Ok(Storage { logger, flags })
    }

    /// LED states from the EEPROM, falling back to [DEFAULT_LEDS] (and storing them) if
    /// any of the stored states does not validate.
    pub fn load_leds(&mut self) -> [bool; LED_COUNT] {
        match self.flags.load_all::<_, LED_COUNT>(self.logger.log().store_mut()) {
            Ok(Some(leds)) => leds,
            Ok(None) => {
                hprintln!("No valid LED state in EEPROM, using defaults");
                self.save_leds(&DEFAULT_LEDS);
                DEFAULT_LEDS
            }
            Err(err) => {
                hprintln!("Reading LED state failed: {:?}", err);
                DEFAULT_LEDS
            }
        }
    }

    pub fn save_leds(&mut self, leds: &[bool; LED_COUNT]) {
        if let Err(err) = self.flags.store_all(self.logger.log().store_mut(), leds) {
            hprintln!("Storing LED state failed: {:?}", err);
        }
    }

    /// Persists the new LED states and logs the change of LED `index`.
    pub fn record_toggle(&mut self, leds: &[bool; LED_COUNT], index: usize) {
        self.save_leds(leds);
        self.logger.record(StateChange {
            name: LED_NAMES[index],
            on: leds[index],
        });
    }

    pub fn print_log(&mut self) {
        hprintln!("Printing log messages from memory:");
        let mut count = 0;
        for entry in self.logger.log().entries() {
            match entry {
                Ok(entry) => {
                    hprintln!("{}", entry.as_str());
                    count += 1;
                }
                Err(err) => {
                    hprintln!("Reading the log failed: {}", err);
                    break;
                }
            }
        }
        if count == 0 {
            hprintln!("No log message in memory.");
        }
    }

    pub fn erase_log(&mut self) {
        hprint!("Erasing log messages from memory... ");
        match self.logger.log().erase_all() {
            Ok(()) => hprintln!("done."),
            Err(err) => hprintln!("failed: {}", err),
        }
    }

    /// Appends failed since boot
    pub fn log_failures(&self) -> u32 {
        self.logger.failures()
    }
}
