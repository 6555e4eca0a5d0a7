//! Boolean settings kept at the top of the store, outside the log region.
//!
//! Every flag is stored twice, as its value and as the bitwise inverse of that value.
//! Erased or never-written memory has equal bytes in both places and is therefore never
//! mistaken for a stored setting.

use crate::error::ConfigError;
use crate::log::LogConfig;
use crate::store::ByteStore;

/// Flag `i` lives at `top - 2i` (value) and `top - 2i - 1` (inverse).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlagStore {
    top: u16,
    count: u16,
}

impl FlagStore {
    /// Flags placed downwards from `top`, normally the last address of the device. All
    /// `count` pairs have to fit between address 0 and `top`.
    pub const fn new(top: u16, count: u16) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::NoFlags);
        }
        if 2 * count as u32 > top as u32 + 1 {
            return Err(ConfigError::FlagsDontFit);
        }
        Ok(FlagStore { top, count })
    }

    /// Flags at the highest addresses of `store`.
    pub fn at_top_of<S: ByteStore>(store: &S, count: u16) -> Result<Self, ConfigError> {
        if store.capacity() == 0 {
            return Err(ConfigError::FlagsDontFit);
        }
        let last = (store.capacity() - 1).min(u32::from(u16::MAX));
        FlagStore::new(last as u16, count)
    }

    pub const fn count(&self) -> u16 {
        self.count
    }

    /// Lowest address in use, everything below is free for other data.
    pub const fn lowest_address(&self) -> u16 {
        (self.top as u32 + 1 - 2 * self.count as u32) as u16
    }

    /// `true` if any flag byte falls inside the region of `log`.
    pub const fn overlaps(&self, log: &LogConfig) -> bool {
        let log_start = log.base_address() as u32;
        let log_end = log_start + log.region_len();
        (self.lowest_address() as u32) < log_end && self.top as u32 >= log_start
    }

    /// The stored flag or `None` if the pair does not validate.
    ///
    /// # Panics
    /// if `index` is not below the flag count
    pub fn load<S: ByteStore>(&self, store: &mut S, index: u16) -> Result<Option<bool>, S::Error> {
        let (value_at, inverse_at) = self.addresses(index);
        let value = store.read_byte(value_at)?;
        let inverse = store.read_byte(inverse_at)?;

        if value != !inverse {
            return Ok(None);
        }
        Ok(match value {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        })
    }

    /// All flags, or `None` as soon as one of them is invalid.
    pub fn load_all<S: ByteStore, const N: usize>(
        &self,
        store: &mut S,
    ) -> Result<Option<[bool; N]>, S::Error> {
        let mut flags = [false; N];
        for (index, flag) in flags.iter_mut().enumerate() {
            match self.load(store, index as u16)? {
                Some(value) => *flag = value,
                None => return Ok(None),
            }
        }
        Ok(Some(flags))
    }

    pub fn store<S: ByteStore>(&self, store: &mut S, index: u16, value: bool) -> Result<(), S::Error> {
        let (value_at, inverse_at) = self.addresses(index);
        let byte = u8::from(value);
        store.write_byte(value_at, byte)?;
        store.write_byte(inverse_at, !byte)
    }

    pub fn store_all<S: ByteStore>(&self, store: &mut S, values: &[bool]) -> Result<(), S::Error> {
        for (index, &value) in values.iter().enumerate() {
            self.store(store, index as u16, value)?;
        }
        Ok(())
    }

    // construction guarantees 2 * count <= top + 1, so in-range indices never underflow
    fn addresses(&self, index: u16) -> (u16, u16) {
        assert!(index < self.count, "flag {} out of {}", index, self.count);
        let value_at = self.top - 2 * index;
        (value_at, value_at - 1)
    }
}
