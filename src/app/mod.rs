//! Application core — the cooperative scheduler, zero I/O.
//!
//! Holds the device state and the ordered per-tick task list.  All
//! interaction with hardware and the network happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
pub mod state;
