//! Port traits — the hexagonal boundary between the scheduler core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (LED, sensor, clock, WiFi, HTTP listener, log sink)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the scheduler never touches hardware
//! directly and every path through it runs on the host under test.
//!
//! ## Polling contract
//!
//! Every method here is called from the single scheduler thread and must
//! return promptly.  Collaborators expose status/readiness queries that the
//! core polls before acting; there is no error propagation back into the
//! loop.

use core::fmt;
use core::net::Ipv4Addr;

use crate::app::state::DeviceState;
use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond counter since boot.
///
/// Wraps to zero after `u32::MAX` (about 49.7 days).  Consumers must
/// compute elapsed time with `wrapping_sub`.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Hardware ports (driven adapter: domain → GPIO / ADC / SoC)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the status LED.
pub trait LedPort {
    /// Drive the LED to the given logical state.  Polarity is the
    /// adapter's concern.
    fn set_led(&mut self, on: bool);
}

/// Read-side port for the analog sensor.
pub trait SensorPort {
    /// `true` once the driver initialised successfully.
    fn is_ready(&self) -> bool;

    /// Take one sample.  Must not block beyond a single ADC conversion.
    fn read(&mut self) -> Result<f32, SensorError>;
}

/// SoC health queries.
pub trait SystemPort {
    /// Free heap in bytes.
    fn free_heap(&self) -> u32;
}

/// Everything a tick or a route handler needs from the board.
pub trait HardwarePort: LedPort + SensorPort + SystemPort {}

impl<T: LedPort + SensorPort + SystemPort> HardwarePort for T {}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain ↔ WiFi station)
// ───────────────────────────────────────────────────────────────

/// Link state as reported by the connectivity manager.  Read-only to the
/// core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    /// The radio driver refused to start or associate.
    StartFailed,
    /// Link not up after the configured number of attempts.
    RetriesExhausted { attempts: u32 },
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::StartFailed => write!(f, "WiFi driver failed to start"),
            Self::RetriesExhausted { attempts } => {
                write!(f, "not connected after {} attempts", attempts)
            }
        }
    }
}

pub trait ConnectivityPort {
    /// Kick off association.  Returns immediately; progress is observed
    /// through [`state`](Self::state).
    fn begin(&mut self) -> Result<(), ConnectivityError>;

    /// Current link state.
    fn state(&self) -> ConnectionState;

    /// Assigned station address, once connected.
    fn local_ip(&self) -> Option<Ipv4Addr>;

    /// Give up on the link for the rest of this boot.
    fn abandon(&mut self);

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

// ───────────────────────────────────────────────────────────────
// Request dispatcher port (driving adapter: network → domain)
// ───────────────────────────────────────────────────────────────

/// Single-pass HTTP servicing, invoked once per tick while connected.
pub trait RequestDispatcher {
    /// Handle whatever requests are pending right now and return how many
    /// were served.  Returns `0` immediately when nothing is waiting.
    fn service_pending<H: HardwarePort>(
        &mut self,
        state: &mut DeviceState,
        hw: &mut H,
        now_ms: u32,
    ) -> usize;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log today).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
