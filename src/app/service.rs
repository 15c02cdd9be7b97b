//! Application service — the cooperative scheduler loop.
//!
//! [`AppService`] owns the [`DeviceState`] and the optional web
//! dispatcher.  One call to [`tick`](AppService::tick) is one pass over
//! the ordered task list; nothing in it blocks.
//!
//! ```text
//!  ConnectivityPort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                       │         AppService          │
//! RequestDispatcher ◀──│ web · sensor · blink · status│
//!                       └─────────────────────────────┘
//!                                   │
//!                                   ▼
//!                             HardwarePort
//! ```
//!
//! ## Tick order
//!
//! 1. Service pending HTTP requests (only while connected).
//! 2. Sensor sampling task.
//! 3. Blink task.
//! 4. Status report, every `status_every_blinks` blinks.
//!
//! Later steps observe state mutated by earlier ones in the same tick.
//! The cooperative yield (step 5) belongs to the caller, see
//! [`run_forever`](AppService::run_forever).
//!
//! The status cadence is derived from the blink count rather than from
//! its own timer, so changing the blink interval changes the report
//! interval too.

use log::{debug, info, warn};

use crate::config::DeviceConfig;

use super::events::{AppEvent, StatusReport};
use super::ports::{ClockPort, ConnectivityPort, EventSink, HardwarePort, RequestDispatcher};
use super::state::DeviceState;

// ───────────────────────────────────────────────────────────────
// Tick summary
// ───────────────────────────────────────────────────────────────

/// What happened during one tick.  Used by tests and debug traces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// HTTP requests handled (0 when offline or idle).
    pub requests_served: usize,
    /// The sampling task fired (regardless of read outcome).
    pub sensor_fired: bool,
    /// A new value was stored.
    pub sampled: bool,
    pub blinked: bool,
    pub reported: bool,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService<D> {
    config: DeviceConfig,
    state: DeviceState,
    /// `None` in offline mode: the dispatcher never runs again this boot.
    web: Option<D>,
    tick_count: u64,
}

impl<D: RequestDispatcher> AppService<D> {
    pub fn new(config: DeviceConfig, web: Option<D>) -> Self {
        let state = DeviceState::new(&config);
        Self {
            config,
            state,
            web,
            tick_count: 0,
        }
    }

    /// Drive the LED to its boot level and announce the start.
    pub fn start(&mut self, hw: &mut impl HardwarePort, sink: &mut impl EventSink) {
        self.state.set_led(false, hw);
        sink.emit(&AppEvent::Started {
            online: self.web.is_some(),
            sensor_ready: self.config.sensor_enabled && hw.is_ready(),
        });
        info!(
            "AppService started ({}, blink every {}ms)",
            if self.web.is_some() { "online" } else { "offline" },
            self.config.blink_interval_ms
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one pass of the scheduler at clock time `now_ms`.
    pub fn tick(
        &mut self,
        now_ms: u32,
        net: &impl ConnectivityPort,
        hw: &mut impl HardwarePort,
        sink: &mut impl EventSink,
    ) -> TickSummary {
        self.tick_count += 1;
        self.state.observe_clock(now_ms);
        let mut summary = TickSummary::default();

        // 1. Web requests
        if net.is_connected() {
            if let Some(web) = self.web.as_mut() {
                summary.requests_served = web.service_pending(&mut self.state, hw, now_ms);
            }
        }

        // 2. Sensor sampling
        if self.config.sensor_enabled && self.state.sensor.poll(now_ms) {
            summary.sensor_fired = true;
            if hw.is_ready() {
                match hw.read() {
                    Ok(value) => {
                        self.state.record_sample(value, now_ms);
                        sink.emit(&AppEvent::SensorSample(value));
                        summary.sampled = true;
                    }
                    Err(e) => {
                        sink.emit(&AppEvent::SensorReadFailed(e));
                    }
                }
            }
        }

        // 3. Blink
        if self.state.blink.poll(now_ms) {
            self.state.toggle_led(hw);
            self.state.blink_counter += 1;
            summary.blinked = true;
            sink.emit(&AppEvent::Blink {
                led_on: self.state.led_on,
                count: self.state.blink_counter,
            });

            // 4. Status report
            if self.state.blink_counter >= self.config.status_every_blinks {
                let report = self.status_report(net, hw);
                if report.low_heap {
                    warn!(
                        "Free heap {} bytes below threshold {}",
                        report.free_heap, self.config.heap_warn_threshold
                    );
                }
                sink.emit(&AppEvent::Status(report));
                self.state.blink_counter = 0;
                summary.reported = true;
            }
        }

        if summary.requests_served > 0 {
            debug!("tick {}: {:?}", self.tick_count, summary);
        }
        summary
    }

    /// Tick forever.  `yield_now` runs after every tick and must hand the
    /// CPU back to the platform (watchdog feed + short delay).
    pub fn run_forever(
        &mut self,
        clock: &impl ClockPort,
        net: &impl ConnectivityPort,
        hw: &mut impl HardwarePort,
        sink: &mut impl EventSink,
        mut yield_now: impl FnMut(),
    ) -> ! {
        loop {
            self.tick(clock.now_ms(), net, hw, sink);
            yield_now();
        }
    }

    fn status_report(
        &self,
        net: &impl ConnectivityPort,
        hw: &impl HardwarePort,
    ) -> StatusReport {
        let connection = net.state();
        let free_heap = hw.free_heap();
        StatusReport {
            uptime_secs: self.state.uptime_secs(),
            blinks: self.state.blink_counter,
            connection,
            ip: if net.is_connected() { net.local_ip() } else { None },
            led_on: self.state.led_on,
            sensor_value: self.state.last_sensor_value,
            free_heap,
            low_heap: free_heap < self.config.heap_warn_threshold,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Mutable access for callers that service requests outside `tick`.
    pub fn state_mut(&mut self) -> &mut DeviceState {
        &mut self.state
    }

    pub fn is_online(&self) -> bool {
        self.web.is_some()
    }

    pub fn web(&self) -> Option<&D> {
        self.web.as_ref()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }
}
