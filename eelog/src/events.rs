//! Application-facing side of the log: boot marker and state change lines.
//!
//! Logging is best effort. A failed append is reported on the diagnostic console and
//! counted, the caller's control loop never sees it.

use core::fmt::{self, Write};

use heapless::String;

use crate::log::CircularLog;
use crate::record::MAX_PAYLOAD;
use crate::store::ByteStore;

pub const BOOT_MESSAGE: &str = "Boot";

/// A monitored boolean attribute took a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateChange<'a> {
    pub name: &'a str,
    pub on: bool,
}

impl fmt::Display for StateChange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, if self.on { "on" } else { "off" })
    }
}

/// Formatting target that keeps whole characters up to one slot payload.
struct Line(String<MAX_PAYLOAD>);

impl Write for Line {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            self.0.push(c).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

pub struct StateEventLogger<S, W> {
    log: CircularLog<S>,
    console: W,
    failures: u32,
}

impl<S, W> StateEventLogger<S, W>
where
    S: ByteStore,
    W: Write,
{
    /// `console` receives one line per failed append.
    pub fn new(log: CircularLog<S>, console: W) -> Self {
        StateEventLogger {
            log,
            console,
            failures: 0,
        }
    }

    /// Records the boot marker.
    pub fn boot(&mut self) -> bool {
        self.note(BOOT_MESSAGE)
    }

    /// Records `change` as `"<name>: on"` or `"<name>: off"`.
    pub fn record(&mut self, change: StateChange<'_>) -> bool {
        let mut line = Line(String::new());
        // a full line just stops taking characters
        let _ = write!(line, "{}", change);
        self.note(&line.0)
    }

    /// Appends `message`, returns whether it reached the log.
    pub fn note(&mut self, message: &str) -> bool {
        match self.log.append(message) {
            Ok(_) => true,
            Err(err) => {
                self.failures = self.failures.saturating_add(1);
                error!("log append failed ({} so far)", self.failures);
                let _ = write!(self.console, "log write failed: {}\r\n", err);
                false
            }
        }
    }

    /// Failed appends since construction.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn log(&mut self) -> &mut CircularLog<S> {
        &mut self.log
    }

    pub fn console(&mut self) -> &mut W {
        &mut self.console
    }

    pub fn into_parts(self) -> (CircularLog<S>, W) {
        (self.log, self.console)
    }
}
