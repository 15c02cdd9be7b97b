//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to              |
//! |-------------|--------------------|--------------------------|
//! | `hardware`  | LedPort            | LED GPIO (PinDriver)     |
//! |             | SensorPort         | ESP32 ADC1 oneshot       |
//! |             | SystemPort         | Heap statistics          |
//! | `log_sink`  | EventSink          | Serial log output        |
//! | `time`      | ClockPort          | ESP32 system timer       |
//! | `wifi`      | ConnectivityPort   | ESP-IDF WiFi STA         |
//!
//! The HTTP dispatcher lives in [`crate::http::server`].

pub mod hardware;
pub mod log_sink;
pub mod time;
pub mod wifi;
