//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Per-blink records are `debug!`, so they vanish at the default `Info`
//! level without any conditional compilation.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { online, sensor_ready } => {
                info!(
                    "START | mode={} | sensor={}",
                    if *online { "online" } else { "offline" },
                    if *sensor_ready { "ready" } else { "absent" },
                );
            }
            AppEvent::SensorSample(value) => {
                info!("SENSOR | reading={:.2}%", value);
            }
            AppEvent::SensorReadFailed(e) => {
                warn!("SENSOR | read failed ({}), keeping previous value", e);
            }
            AppEvent::Blink { led_on, count } => {
                debug!("LED | {} | blink #{}", if *led_on { "ON" } else { "OFF" }, count);
            }
            AppEvent::Status(s) => {
                info!(
                    "STATUS | running | uptime={}s | blinks={} | led={} | heap={}B",
                    s.uptime_secs,
                    s.blinks,
                    if s.led_on { "ON" } else { "OFF" },
                    s.free_heap,
                );
                match s.ip {
                    Some(ip) => info!("STATUS | wifi={} ({})", s.connection, ip),
                    None => info!("STATUS | wifi={}", s.connection),
                }
                if let Some(v) = s.sensor_value {
                    info!("STATUS | sensor={:.2}%", v);
                }
            }
        }
    }
}
