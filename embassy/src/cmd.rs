//! A Software Abstraction Layer for Commands based upon the [Commands] enum, the parsing
//! method [str_to_command] and communication with the command executor via a [Channel].
//!
//! Console lines and button presses both end up as [Commands] so that a single task owns
//! the EEPROM and nothing else ever writes to it.

use cortex_m_semihosting::hprintln;

use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

use crate::storage::LED_COUNT;

pub type CommandChannel = Channel<ThreadModeRawMutex, Commands, 64>;
pub type CommandSender = Sender<'static, ThreadModeRawMutex, Commands, 64>;
pub type CommandReceiver = Receiver<'static, ThreadModeRawMutex, Commands, 64>;

#[derive(Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Commands {
    /// prints every valid log entry, oldest first
    ReadLog,

    /// marks all log slots as erased
    EraseLog,

    /// prints the uptime and the LED states
    Status,

    /// toggles the LED with the given index (0 based), sent by the button watchers
    Toggle(u8),
}

pub fn str_to_command(msg: &str) -> Option<Commands> {
    let mut words = msg.split_whitespace();
    let cmd = match (words.next(), words.next(), words.next()) {
        (Some("read"), None, None) => Some(Commands::ReadLog),
        (Some("erase"), None, None) => Some(Commands::EraseLog),
        (Some("status"), None, None) => Some(Commands::Status),
        // "toggle 1" .. "toggle 3", same numbering as D1..D3
        (Some("toggle"), Some(number), None) => match number.parse::<u8>() {
            Ok(n) if (1..=LED_COUNT as u8).contains(&n) => Some(Commands::Toggle(n - 1)),
            _ => None,
        },
        _ => None,
    };

    if cmd.is_none() {
        hprintln!("{} command unknown!", msg);
    }
    cmd
}
