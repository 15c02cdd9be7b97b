//! GPIO / peripheral pin assignments for the ESP32-S3-DevKitC-1.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// On-board LED (GPIO48 on the DevKitC-1; GPIO2 on most ESP32 dev boards).
pub const LED_GPIO: i32 = 48;

// ---------------------------------------------------------------------------
// Analog sensor (ADC1)
// ---------------------------------------------------------------------------

/// Analog sensor input.
pub const SENSOR_ADC_GPIO: i32 = 1;
/// ADC1 channel wired to [`SENSOR_ADC_GPIO`].
pub const SENSOR_ADC_CHANNEL: u32 = 0;
/// Full-scale raw value at 12-bit resolution.
pub const ADC_MAX_RAW: u16 = 4095;
