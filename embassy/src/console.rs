//! Semihosting console used for status output and log diagnostics.

use core::fmt;

use cortex_m_semihosting::{hprint, hprintln};
use embassy_time::Instant;

use crate::led::LED_NAMES;

/// [fmt::Write] over semihosting, handed to the event logger for its failure reports
pub struct HostConsole;

impl fmt::Write for HostConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        hprint!("{}", s);
        Ok(())
    }
}

pub fn print_status(leds: &[bool]) {
    hprintln!("{}s since power up.", Instant::now().as_secs());
    for (name, on) in LED_NAMES.iter().zip(leds) {
        hprintln!("{}: {}", name, if *on { "on" } else { "off" });
    }
    hprintln!("");
}
