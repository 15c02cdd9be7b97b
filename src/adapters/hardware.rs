//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the status LED and the analog sensor, exposing them through
//! [`LedPort`], [`SensorPort`] and [`SystemPort`].  This is the only
//! module in the system that touches actual hardware.  On non-espidf
//! targets, the underlying drivers use cfg-gated simulation stubs.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{LedPort, SensorPort, SystemPort};
use crate::drivers::hw_init;
use crate::drivers::status_led::StatusLed;
use crate::error::SensorError;
use crate::sensors::analog::AnalogSensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P: OutputPin> {
    led: StatusLed<P>,
    sensor: AnalogSensor,
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(led: StatusLed<P>, sensor: AnalogSensor) -> Self {
        Self { led, sensor }
    }

    pub fn led(&self) -> &StatusLed<P> {
        &self.led
    }
}

// ── LedPort implementation ────────────────────────────────────

impl<P: OutputPin> LedPort for HardwareAdapter<P> {
    fn set_led(&mut self, on: bool) {
        self.led.set(on);
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: OutputPin> SensorPort for HardwareAdapter<P> {
    fn is_ready(&self) -> bool {
        self.sensor.is_ready()
    }

    fn read(&mut self) -> Result<f32, SensorError> {
        self.sensor.read()
    }
}

// ── SystemPort implementation ─────────────────────────────────

impl<P: OutputPin> SystemPort for HardwareAdapter<P> {
    fn free_heap(&self) -> u32 {
        hw_init::free_heap_bytes()
    }
}
