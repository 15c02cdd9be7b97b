//! Mock adapters for integration tests.
//!
//! Records every LED write and event so tests can assert on the full
//! history without touching real GPIO or ADC registers.

use std::cell::Cell;
use std::collections::VecDeque;
use std::net::Ipv4Addr;

use ledbeacon::app::events::AppEvent;
use ledbeacon::app::ports::{
    ConnectionState, ConnectivityError, ConnectivityPort, EventSink, HardwarePort, LedPort,
    RequestDispatcher, SensorPort, SystemPort,
};
use ledbeacon::app::state::DeviceState;
use ledbeacon::error::SensorError;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Every level written through `LedPort`, oldest first.
    pub led_writes: Vec<bool>,
    pub sensor_ready: bool,
    /// Scripted read results; an empty queue repeats `default_reading`.
    pub readings: VecDeque<Result<f32, SensorError>>,
    pub default_reading: Result<f32, SensorError>,
    pub reads: u32,
    pub free_heap: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            led_writes: Vec::new(),
            sensor_ready: true,
            readings: VecDeque::new(),
            default_reading: Ok(50.0),
            reads: 0,
            free_heap: 200_000,
        }
    }

    pub fn led(&self) -> Option<bool> {
        self.led_writes.last().copied()
    }

    pub fn script(&mut self, results: impl IntoIterator<Item = Result<f32, SensorError>>) {
        self.readings.extend(results);
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl LedPort for MockHardware {
    fn set_led(&mut self, on: bool) {
        self.led_writes.push(on);
    }
}

impl SensorPort for MockHardware {
    fn is_ready(&self) -> bool {
        self.sensor_ready
    }

    fn read(&mut self) -> Result<f32, SensorError> {
        self.reads += 1;
        self.readings.pop_front().unwrap_or(self.default_reading)
    }
}

impl SystemPort for MockHardware {
    fn free_heap(&self) -> u32 {
        self.free_heap
    }
}

// ── MockLink ──────────────────────────────────────────────────

/// Connectivity stub with a fixed state.  Counts `state()` queries.
pub struct MockLink {
    pub state: ConnectionState,
    pub queries: Cell<u32>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn connected() -> Self {
        Self {
            state: ConnectionState::Connected,
            queries: Cell::new(0),
        }
    }

    pub fn offline() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            queries: Cell::new(0),
        }
    }
}

impl ConnectivityPort for MockLink {
    fn begin(&mut self) -> Result<(), ConnectivityError> {
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        self.queries.set(self.queries.get() + 1);
        self.state
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        (self.state == ConnectionState::Connected).then_some(Ipv4Addr::new(10, 0, 0, 7))
    }

    fn abandon(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}

// ── MockDispatcher ────────────────────────────────────────────

/// Records each invocation and the LED state it observed.
#[derive(Default)]
pub struct MockDispatcher {
    pub calls: u32,
    /// `led_on` as seen at each call.
    pub seen_led: Vec<bool>,
    /// When set, every call toggles the LED as `/toggle` would.
    pub toggle_each_call: bool,
}

impl RequestDispatcher for MockDispatcher {
    fn service_pending<H: HardwarePort>(
        &mut self,
        state: &mut DeviceState,
        hw: &mut H,
        _now_ms: u32,
    ) -> usize {
        self.calls += 1;
        self.seen_led.push(state.led_on);
        if self.toggle_each_call {
            state.toggle_led(hw);
            1
        } else {
            0
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn statuses(&self) -> impl Iterator<Item = &AppEvent> {
        self.events.iter().filter(|e| matches!(e, AppEvent::Status(_)))
    }

    pub fn blink_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Blink { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
