use thiserror::Error;

/// Failure of a log operation. `E` is the error type of the underlying [crate::ByteStore].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LogError<E> {
    /// the message has no characters, nothing was written
    #[error("log message must contain at least one character")]
    EmptyMessage,

    /// the message carries a NUL byte inside the stored part, nothing was written
    #[error("log message contains a NUL byte at offset {0}")]
    InteriorNul(usize),

    /// the store failed to read or write `address`
    #[error("persistent store access failed at address {address:#06x}: {cause:?}")]
    Store { address: u16, cause: E },
}

impl<E> LogError<E> {
    /// `true` when the message was rejected before touching the store.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, LogError::EmptyMessage | LogError::InteriorNul(_))
    }
}

/// Reason a slot does not hold a valid record. Reading stops at the first one.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidSlot {
    #[error("slot is erased")]
    Erased,

    #[error("no terminator within the first {} bytes", crate::record::MAX_PAYLOAD + 1)]
    MissingTerminator,

    #[error("crc mismatch: stored {stored:#06x}, computed {computed:#06x}")]
    CrcMismatch { stored: u16, computed: u16 },

    #[error("payload is not valid utf-8")]
    NotUtf8,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("a log needs at least one slot")]
    NoSlots,

    #[error("log region ends beyond the 16 bit address space")]
    RegionTooLarge,

    #[error("log region ends beyond the capacity of the store")]
    RegionOutsideStore,

    #[error("a flag store needs at least one flag")]
    NoFlags,

    #[error("flags do not fit below their top address")]
    FlagsDontFit,

    #[error("flags overlap the log region")]
    FlagsOverlapLog,
}
