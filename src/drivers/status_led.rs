//! Single-colour status LED driver.
//!
//! Generic over any `embedded_hal::digital::OutputPin`: on ESP-IDF that is
//! an `esp_idf_hal::gpio::PinDriver`, under test a recording mock.
//!
//! Tracks the *logical* state; `active_high` decides which electrical
//! level lights the LED.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct StatusLed<P: OutputPin> {
    pin: P,
    active_high: bool,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Wrap `pin`.  Does not touch the pin; call [`set`](Self::set) to
    /// establish the boot level.
    pub fn new(pin: P, active_high: bool) -> Self {
        Self {
            pin,
            active_high,
            on: false,
        }
    }

    pub fn set(&mut self, on: bool) {
        let high = on == self.active_high;
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = result {
            warn!("StatusLed: GPIO write failed ({:?})", e);
        }
        self.on = on;
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Hand the pin back (tests inspect the mock through this).
    pub fn release(self) -> P {
        self.pin
    }
}
