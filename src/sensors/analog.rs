//! Analog sensor driver.
//!
//! Reads a raw 12-bit value through an ESP32-S3 ADC1 channel and scales
//! it to a 0–100 % reading.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised in `begin`).
//! On host/test: reads from per-instance injected values.

use crate::drivers::hw_init;
use crate::error::SensorError;
use crate::pins::ADC_MAX_RAW;

pub struct AnalogSensor {
    channel: u32,
    ready: bool,
    #[cfg(not(target_os = "espidf"))]
    sim: SimAdc,
}

/// Host-side ADC stand-in.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy)]
struct SimAdc {
    present: bool,
    raw: Option<u16>,
}

impl AnalogSensor {
    pub fn new(channel: u32) -> Self {
        Self {
            channel,
            ready: false,
            #[cfg(not(target_os = "espidf"))]
            sim: SimAdc {
                present: true,
                raw: Some(0),
            },
        }
    }

    /// Configure the ADC channel.  On failure the sensor stays not-ready
    /// and the scheduler skips sampling.
    pub fn begin(&mut self) -> Result<(), SensorError> {
        self.platform_init()?;
        self.ready = true;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn read(&mut self) -> Result<f32, SensorError> {
        if !self.ready {
            return Err(SensorError::NotInitialised);
        }
        let raw = self.platform_read().ok_or(SensorError::AdcReadFailed)?;
        if raw > ADC_MAX_RAW {
            return Err(SensorError::OutOfRange);
        }
        Ok(raw_to_percent(raw))
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_init(&mut self) -> Result<(), SensorError> {
        hw_init::init_sensor_adc(self.channel).map_err(|e| {
            log::warn!("Sensor: {}", e);
            SensorError::NotInitialised
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_init(&mut self) -> Result<(), SensorError> {
        if !self.sim.present {
            return Err(SensorError::NotInitialised);
        }
        hw_init::init_sensor_adc(self.channel).map_err(|_| SensorError::NotInitialised)
    }

    #[cfg(target_os = "espidf")]
    fn platform_read(&self) -> Option<u16> {
        hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_read(&self) -> Option<u16> {
        self.sim.raw
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Simulation: `None` makes the next reads fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_raw(&mut self, raw: Option<u16>) {
        self.sim.raw = raw;
    }

    /// Simulation: an absent sensor fails `begin()`.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_present(&mut self, present: bool) {
        self.sim.present = present;
    }
}

/// Linear scale of a 12-bit reading onto 0–100 %.
pub fn raw_to_percent(raw: u16) -> f32 {
    f32::from(raw.min(ADC_MAX_RAW)) * 100.0 / f32::from(ADC_MAX_RAW)
}
