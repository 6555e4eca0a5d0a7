//! Sample-counting debounce for push buttons.
//!
//! Call [Debouncer::sample] at a fixed period (10 ms works well). A new level is accepted
//! once it has been seen `filter` times in a row; accepting the pressed level yields one
//! press event, holding the button yields nothing further.

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    pressed_level: bool,
    stable: bool,
    count: u8,
    filter: u8,
}

impl Debouncer {
    /// `pressed_level` is the pin level of a pressed button, `false` for a pull-up wiring.
    ///
    /// The debouncer starts out as if the button were pressed, so a released button at
    /// power-up settles without emitting an event.
    pub const fn new(pressed_level: bool, filter: u8) -> Self {
        Debouncer {
            pressed_level,
            stable: pressed_level,
            count: 0,
            filter: if filter == 0 { 1 } else { filter },
        }
    }

    /// Feeds one sample, returns `true` exactly when a press is accepted.
    pub fn sample(&mut self, level: bool) -> bool {
        if level == self.stable {
            self.count = 0;
            return false;
        }

        self.count += 1;
        if self.count < self.filter {
            return false;
        }

        self.stable = level;
        self.count = 0;
        level == self.pressed_level
    }

    /// Debounced state of the button.
    pub fn is_pressed(&self) -> bool {
        self.stable == self.pressed_level
    }
}
