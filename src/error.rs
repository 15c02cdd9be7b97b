//! Unified error types for the LedBeacon firmware.
//!
//! `Error` covers the boot-time failures that `main` reports; the leaf
//! enums below are returned directly by the sensor and the HTTP exchange.
//! Link failures have their own type,
//! [`ConnectivityError`](crate::app::ports::ConnectivityError), on the
//! connectivity port.  All variants are `Copy` so they can be passed
//! through the scheduler and event sink without allocation.
//!
//! None of these are fatal to the scheduler loop: the loop logs them and
//! carries on with the next task.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A network service could not be brought up.
    Comms(CommsError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// `read()` called before a successful `begin()`.
    NotInitialised,
    /// ADC read returned an error.
    AdcReadFailed,
    /// Raw reading is outside the ADC's representable range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialised => write!(f, "sensor not initialised"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// The HTTP listener could not be bound.
    ListenerBindFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListenerBindFailed => write!(f, "HTTP listener bind failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// HTTP errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpError {
    /// Socket read failed or timed out.
    Read,
    /// Socket write failed.
    Write,
    /// Peer closed the connection before a full request line arrived.
    Closed,
    /// Request line could not be parsed.
    Parse,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read failed"),
            Self::Write => write!(f, "write failed"),
            Self::Closed => write!(f, "connection closed"),
            Self::Parse => write!(f, "malformed request"),
        }
    }
}
