//! Debounced push buttons SW0..SW2. They are wired against ground with the internal
//! pull-up, so a pressed button reads low.

use embassy_stm32::gpio::Input;
use embassy_time::{Duration, Ticker};

use eelog::Debouncer;

use crate::cmd::{CommandSender, Commands};

/// sampling period of the buttons
pub const BUTTON_PERIOD_MS: u64 = 10;
/// samples a new level has to be stable for
pub const BUTTON_FILTER: u8 = 5;

/// Samples `button` forever and sends one `Toggle(led)` per press, holding the button
/// does not repeat.
pub async fn button_watcher(button: Input<'_>, led: u8, sender: CommandSender) -> ! {
    let mut debouncer = Debouncer::new(false, BUTTON_FILTER);
    let mut ticker = Ticker::every(Duration::from_millis(BUTTON_PERIOD_MS));

    loop {
        ticker.next().await;
        if debouncer.sample(button.is_high()) {
            defmt::debug!("button for led {} pressed", led);
            sender.send(Commands::Toggle(led)).await;
        }
    }
}
