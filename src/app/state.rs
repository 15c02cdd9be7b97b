//! The single mutable device record.
//!
//! Owned by [`AppService`](super::service::AppService) and lent by
//! `&mut` to route handlers, so there are no module-level globals and no
//! locks: the scheduler loop and the HTTP dispatcher run on the same
//! thread and each request completes before the loop continues.

use crate::config::DeviceConfig;
use crate::scheduler::PeriodicTask;

use super::ports::LedPort;

#[derive(Debug, Clone)]
pub struct DeviceState {
    /// Logical LED state (polarity handled by the LED adapter).
    pub led_on: bool,
    /// Blink cadence; `blink.last_fire_ms()` is the last blink time.
    pub blink: PeriodicTask,
    /// Sampling cadence; `sensor.last_fire_ms()` is the last read attempt.
    pub sensor: PeriodicTask,
    /// Blinks since the last status report.
    pub blink_counter: u32,
    /// Most recent successful sample.  Failed reads leave it untouched.
    pub last_sensor_value: Option<f32>,
    /// Clock time of `last_sensor_value`.
    pub last_sensor_update_ms: u32,
    /// Clock reading at the last [`observe_clock`](Self::observe_clock).
    last_clock_ms: u32,
    /// Time since boot, widened so it keeps counting after the 32-bit
    /// clock wraps (about 49.7 days).
    uptime_ms: u64,
}

impl DeviceState {
    /// Boot state: LED off, every timestamp zero.
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            led_on: false,
            blink: PeriodicTask::new(config.blink_interval_ms),
            sensor: PeriodicTask::new(config.sensor_interval_ms),
            blink_counter: 0,
            last_sensor_value: None,
            last_sensor_update_ms: 0,
            last_clock_ms: 0,
            uptime_ms: 0,
        }
    }

    /// Advance the uptime counter to `now_ms`.  Must be called more often
    /// than once per clock period, which every scheduler tick is.
    pub fn observe_clock(&mut self, now_ms: u32) {
        self.uptime_ms += u64::from(now_ms.wrapping_sub(self.last_clock_ms));
        self.last_clock_ms = now_ms;
    }

    pub fn uptime_secs(&self) -> u64 {
        self.uptime_ms / 1000
    }

    pub fn last_blink_ms(&self) -> u32 {
        self.blink.last_fire_ms()
    }

    pub fn last_sensor_read_ms(&self) -> u32 {
        self.sensor.last_fire_ms()
    }

    /// Drive the LED and record the new state.
    pub fn set_led(&mut self, on: bool, led: &mut impl LedPort) {
        self.led_on = on;
        led.set_led(on);
    }

    /// Invert the LED.  Returns the new state.
    pub fn toggle_led(&mut self, led: &mut impl LedPort) -> bool {
        self.set_led(!self.led_on, led);
        self.led_on
    }

    pub fn record_sample(&mut self, value: f32, now_ms: u32) {
        self.last_sensor_value = Some(value);
        self.last_sensor_update_ms = now_ms;
    }

    /// Milliseconds since the last successful sample, wraparound-safe.
    pub fn sensor_age_ms(&self, now_ms: u32) -> Option<u32> {
        self.last_sensor_value
            .map(|_| now_ms.wrapping_sub(self.last_sensor_update_ms))
    }
}
