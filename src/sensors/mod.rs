//! Sensor subsystem.
//!
//! A single analog input today; the hardware adapter owns it and exposes
//! it through [`SensorPort`](crate::app::ports::SensorPort).

pub mod analog;
