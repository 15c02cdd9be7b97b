//! System configuration parameters
//!
//! Timing, retry, and logging policy for the device.  Fixed at build time:
//! `main` constructs [`DeviceConfig::default()`], validates it once, and
//! never changes it at runtime.

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Project name shown in the boot banner and the dashboard title.
pub const PROJECT_NAME: &str = "LedBeacon";

/// Console UART baud rate (informational; set by sdkconfig on ESP-IDF).
pub const SERIAL_BAUD: u32 = 115_200;

/// Station SSID, injected at build time (`WIFI_SSID=... cargo build`).
pub const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(ssid) => ssid,
    None => "YOUR_WIFI_SSID",
};

/// Station password, injected at build time.
pub const WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(pass) => pass,
    None => "YOUR_WIFI_PASSWORD",
};

/// Core device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Timing ---
    /// LED blink half-period (milliseconds)
    pub blink_interval_ms: u32,
    /// Sensor sampling interval (milliseconds)
    pub sensor_interval_ms: u32,
    /// Emit a status report every N blinks
    pub status_every_blinks: u32,
    /// Cooperative yield at the end of every tick (milliseconds)
    pub loop_delay_ms: u32,

    // --- WiFi ---
    /// Connect attempts before falling back to offline mode
    pub wifi_max_attempts: u32,
    /// Delay between connect attempts (milliseconds)
    pub wifi_retry_delay_ms: u32,

    // --- Web ---
    /// HTTP listener port
    pub http_port: u16,

    // --- Hardware ---
    /// Run the periodic sensor sampling task
    pub sensor_enabled: bool,
    /// true if the LED lights when the pin is driven HIGH
    pub led_active_high: bool,

    // --- Health ---
    /// Free heap (bytes) below which status reports warn
    pub heap_warn_threshold: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Logging ---
    /// Maximum log level; `Debug` enables per-blink and per-request traces
    pub log_level: LevelFilter,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            // Timing
            blink_interval_ms: 1000,
            sensor_interval_ms: 5000,
            status_every_blinks: 10,
            loop_delay_ms: 10,

            // WiFi: 20 × 500 ms ≈ 10 s budget
            wifi_max_attempts: 20,
            wifi_retry_delay_ms: 500,

            // Web
            http_port: 80,

            // Hardware
            sensor_enabled: true,
            led_active_high: true,

            // Health
            heap_warn_threshold: 10_000,
            watchdog_timeout_ms: 10_000,

            // Logging
            log_level: LevelFilter::Info,
        }
    }
}

impl DeviceConfig {
    /// Reject values that would stall or spin the scheduler loop.
    pub fn validate(&self) -> Result<(), Error> {
        if self.blink_interval_ms == 0 {
            return Err(Error::Config("blink_interval_ms must be > 0"));
        }
        if self.sensor_enabled && self.sensor_interval_ms == 0 {
            return Err(Error::Config("sensor_interval_ms must be > 0"));
        }
        if self.status_every_blinks == 0 {
            return Err(Error::Config("status_every_blinks must be > 0"));
        }
        if self.loop_delay_ms >= self.blink_interval_ms {
            return Err(Error::Config("loop_delay_ms must be shorter than blink_interval_ms"));
        }
        if self.wifi_max_attempts == 0 {
            return Err(Error::Config("wifi_max_attempts must be > 0"));
        }
        if self.watchdog_timeout_ms <= self.loop_delay_ms {
            return Err(Error::Config("watchdog_timeout_ms must exceed loop_delay_ms"));
        }
        Ok(())
    }

    /// Total time budget for the startup connect attempt.
    pub fn wifi_connect_budget_ms(&self) -> u32 {
        self.wifi_max_attempts.saturating_mul(self.wifi_retry_delay_ms)
    }
}
