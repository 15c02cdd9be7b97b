//! LED driver, hardware initialisation, and the task watchdog.

pub mod hw_init;
pub mod status_led;
pub mod watchdog;
