//! Integration tests for the cooperative scheduler loop.
//!
//! Each test drives `AppService::tick` with an explicit clock and checks
//! the observable effects through the mock adapters.

use ledbeacon::app::events::AppEvent;
use ledbeacon::app::service::AppService;
use ledbeacon::config::DeviceConfig;
use ledbeacon::error::SensorError;
use ledbeacon::scheduler::PeriodicTask;

use crate::mock_hw::{MockDispatcher, MockHardware, MockLink, RecordingSink};

fn online_app(dispatcher: MockDispatcher) -> AppService<MockDispatcher> {
    AppService::new(DeviceConfig::default(), Some(dispatcher))
}

// ── Status cadence ────────────────────────────────────────────

#[test]
fn status_reports_on_every_tenth_blink() {
    let mut app = online_app(MockDispatcher::default());
    let net = MockLink::connected();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::default();
    app.start(&mut hw, &mut sink);

    let mut reported_at = Vec::new();
    for blink in 1..=31u32 {
        let summary = app.tick(blink * 1000, &net, &mut hw, &mut sink);
        assert!(summary.blinked, "blink {blink} should have fired");
        if summary.reported {
            reported_at.push(blink);
        }
    }
    assert_eq!(reported_at, vec![10, 20, 30]);
    assert_eq!(app.state().blink_counter, 1);

    let first = sink.statuses().next().unwrap();
    match first {
        AppEvent::Status(report) => {
            assert_eq!(report.blinks, 10);
            assert_eq!(report.uptime_secs, 10);
            assert_eq!(report.ip, Some(std::net::Ipv4Addr::new(10, 0, 0, 7)));
            assert!(!report.low_heap);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn status_flags_low_heap() {
    let mut app = online_app(MockDispatcher::default());
    let net = MockLink::connected();
    let mut hw = MockHardware::new();
    hw.free_heap = 4_096;
    let mut sink = RecordingSink::default();

    for blink in 1..=10u32 {
        app.tick(blink * 1000, &net, &mut hw, &mut sink);
    }
    match sink.statuses().next() {
        Some(AppEvent::Status(report)) => {
            assert!(report.low_heap);
            assert_eq!(report.free_heap, 4_096);
        }
        other => panic!("expected a status report, got {other:?}"),
    }
}

// ── Tick ordering ─────────────────────────────────────────────

#[test]
fn web_runs_before_blink_in_same_tick() {
    let mut app = online_app(MockDispatcher {
        toggle_each_call: true,
        ..MockDispatcher::default()
    });
    let net = MockLink::connected();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::default();
    app.start(&mut hw, &mut sink);

    let summary = app.tick(1000, &net, &mut hw, &mut sink);
    assert_eq!(summary.requests_served, 1);
    assert!(summary.blinked);

    // start: off, request: on, blink: off
    assert_eq!(hw.led_writes, vec![false, true, false]);
    assert!(!app.state().led_on);
    assert_eq!(app.web().unwrap().seen_led, vec![false]);
}

#[test]
fn status_sees_sample_taken_in_same_tick() {
    let config = DeviceConfig {
        sensor_interval_ms: 10_000,
        ..DeviceConfig::default()
    };
    let mut app = AppService::new(config, Some(MockDispatcher::default()));
    let net = MockLink::connected();
    let mut hw = MockHardware::new();
    hw.script([Ok(61.25)]);
    let mut sink = RecordingSink::default();

    for blink in 1..=10u32 {
        app.tick(blink * 1000, &net, &mut hw, &mut sink);
    }
    match sink.statuses().next() {
        Some(AppEvent::Status(report)) => assert_eq!(report.sensor_value, Some(61.25)),
        other => panic!("expected a status report, got {other:?}"),
    }
}

// ── Offline mode ──────────────────────────────────────────────

#[test]
fn disconnected_link_never_dispatches() {
    let mut app = online_app(MockDispatcher::default());
    let net = MockLink::offline();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::default();

    for t in (0..=20_000u32).step_by(100) {
        app.tick(t, &net, &mut hw, &mut sink);
    }
    assert_eq!(app.web().unwrap().calls, 0);
    assert_eq!(sink.blink_count(), 20);
    assert_eq!(hw.reads, 4);
}

#[test]
fn offline_mode_still_blinks_and_samples() {
    let mut app: AppService<MockDispatcher> = AppService::new(DeviceConfig::default(), None);
    let net = MockLink::connected();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::default();
    app.start(&mut hw, &mut sink);
    assert!(!app.is_online());
    assert_eq!(
        sink.events[0],
        AppEvent::Started {
            online: false,
            sensor_ready: true
        }
    );

    for t in (0..=10_000u32).step_by(10) {
        let summary = app.tick(t, &net, &mut hw, &mut sink);
        assert_eq!(summary.requests_served, 0);
    }
    assert_eq!(sink.blink_count(), 10);
    assert_eq!(app.state().last_sensor_value, Some(50.0));
}

#[test]
fn connected_dispatcher_runs_every_tick() {
    let mut app = online_app(MockDispatcher::default());
    let net = MockLink::connected();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::default();

    for t in 0..50u32 {
        app.tick(t * 10, &net, &mut hw, &mut sink);
    }
    assert_eq!(app.web().unwrap().calls, 50);
    assert_eq!(app.tick_count(), 50);
}

// ── Sensor sampling ───────────────────────────────────────────

#[test]
fn failed_read_keeps_previous_value() {
    let mut app = online_app(MockDispatcher::default());
    let net = MockLink::connected();
    let mut hw = MockHardware::new();
    hw.script([Ok(40.0), Err(SensorError::AdcReadFailed)]);
    let mut sink = RecordingSink::default();

    let first = app.tick(5_000, &net, &mut hw, &mut sink);
    assert!(first.sampled);
    let second = app.tick(10_000, &net, &mut hw, &mut sink);
    assert!(second.sensor_fired);
    assert!(!second.sampled);

    assert_eq!(app.state().last_sensor_value, Some(40.0));
    assert_eq!(app.state().last_sensor_update_ms, 5_000);
    assert_eq!(app.state().last_sensor_read_ms(), 10_000);
    assert!(
        sink.events
            .contains(&AppEvent::SensorReadFailed(SensorError::AdcReadFailed))
    );
}

#[test]
fn sensor_not_ready_skips_read_but_rearms() {
    let mut app = online_app(MockDispatcher::default());
    let net = MockLink::connected();
    let mut hw = MockHardware::new();
    hw.sensor_ready = false;
    let mut sink = RecordingSink::default();

    let summary = app.tick(5_000, &net, &mut hw, &mut sink);
    assert!(summary.sensor_fired);
    assert_eq!(hw.reads, 0);
    assert_eq!(app.state().last_sensor_read_ms(), 5_000);
    assert_eq!(app.state().last_sensor_value, None);
}

#[test]
fn disabled_sensor_is_never_polled() {
    let config = DeviceConfig {
        sensor_enabled: false,
        ..DeviceConfig::default()
    };
    let mut app = AppService::new(config, Some(MockDispatcher::default()));
    let net = MockLink::connected();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::default();

    for t in (0..=30_000u32).step_by(1000) {
        assert!(!app.tick(t, &net, &mut hw, &mut sink).sensor_fired);
    }
    assert_eq!(hw.reads, 0);
}

// ── Clock wraparound ──────────────────────────────────────────

#[test]
fn blink_fires_across_clock_wrap() {
    let mut app = online_app(MockDispatcher::default());
    let net = MockLink::offline();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::default();
    app.state_mut().blink = PeriodicTask::armed_at(1000, u32::MAX - 499);

    assert!(!app.tick(499, &net, &mut hw, &mut sink).blinked);
    assert!(app.tick(500, &net, &mut hw, &mut sink).blinked);
    assert_eq!(app.state().last_blink_ms(), 500);
}

#[test]
fn status_uptime_keeps_counting_after_clock_wrap() {
    let mut app = online_app(MockDispatcher::default());
    let net = MockLink::offline();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::default();
    app.start(&mut hw, &mut sink);

    app.tick(2_000_000_000, &net, &mut hw, &mut sink);
    app.tick(4_294_960_000, &net, &mut hw, &mut sink);
    let mut last = None;
    for k in 1..=8u32 {
        let now = 4_294_960_000u32.wrapping_add(k * 1000);
        last = Some(app.tick(now, &net, &mut hw, &mut sink));
    }
    // The tenth blink lands 704 ms after the wrap.
    assert!(last.unwrap().reported);

    match sink.statuses().next().unwrap() {
        AppEvent::Status(report) => assert_eq!(report.uptime_secs, 4_294_968),
        other => panic!("unexpected event {other:?}"),
    }
}
