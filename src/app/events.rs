//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log today).

use core::net::Ipv4Addr;

use crate::error::SensorError;

use super::ports::ConnectionState;

/// Structured events emitted by the scheduler core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The loop is about to start.
    Started { online: bool, sensor_ready: bool },

    /// A fresh sensor sample was stored.
    SensorSample(f32),

    /// The sampling task fired but the read failed; previous value kept.
    SensorReadFailed(SensorError),

    /// The blink task toggled the LED.
    Blink { led_on: bool, count: u32 },

    /// Periodic status report (every Nth blink).
    Status(StatusReport),
}

/// A point-in-time health snapshot for the serial console.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub uptime_secs: u64,
    pub blinks: u32,
    pub connection: ConnectionState,
    pub ip: Option<Ipv4Addr>,
    pub led_on: bool,
    pub sensor_value: Option<f32>,
    pub free_heap: u32,
    pub low_heap: bool,
}
