//! Hardware agnostic on/off control for the LEDs D1..D3.
//!
//! Every LED is driven by its own task running [led_controller_simple]. The command
//! executor owns the LED state and pushes each new value through the LED's [LedSignal].

use embassy_stm32::gpio::Output;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Carries the new on/off state to an LED task
pub type LedSignal = Signal<CriticalSectionRawMutex, bool>;

/// Names used on the console and in the log, index matches the LED index
pub const LED_NAMES: [&str; 3] = ["D1", "D2", "D3"];

pub async fn led_controller_simple(mut led: Output<'_>, signal: &LedSignal) -> ! {
    loop {
        let on = signal.wait().await;
        led_update_simple(&mut led, on);
    }
}

fn led_update_simple(led_out: &mut Output, on: bool) {
    if on {
        led_out.set_high();
    } else {
        led_out.set_low();
    }
}
