//! End-to-end HTTP tests: a real loopback listener driven by
//! `AppService::tick`, with the host-simulated hardware adapters.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, OutputPin};

use ledbeacon::adapters::hardware::HardwareAdapter;
use ledbeacon::adapters::log_sink::LogEventSink;
use ledbeacon::adapters::wifi::{RetryPolicy, WifiAdapter, connect_with_retry};
use ledbeacon::app::service::AppService;
use ledbeacon::config::DeviceConfig;
use ledbeacon::drivers::status_led::StatusLed;
use ledbeacon::http::server::HttpServer;
use ledbeacon::sensors::analog::AnalogSensor;

/// GPIO stand-in that remembers the last electrical level.
#[derive(Default)]
struct SimPin {
    high: bool,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

struct Rig {
    app: AppService<HttpServer>,
    wifi: WifiAdapter,
    hw: HardwareAdapter<SimPin>,
    sink: LogEventSink,
    addr: SocketAddr,
    now_ms: u32,
}

impl Rig {
    fn boot(sensor_raw: Option<u16>) -> Self {
        let config = DeviceConfig::default();

        let mut sensor = AnalogSensor::new(0);
        sensor.begin().unwrap();
        sensor.sim_set_raw(sensor_raw);
        let mut hw = HardwareAdapter::new(StatusLed::new(SimPin::default(), true), sensor);

        let mut wifi = WifiAdapter::new();
        wifi.set_credentials("bench-ap", "password123").unwrap();
        connect_with_retry(&mut wifi, &RetryPolicy::from_config(&config), |_| {}).unwrap();

        let server = HttpServer::bind_addr(SocketAddr::from(([127, 0, 0, 1], 0)))
            .unwrap()
            .with_io_timeout(Duration::from_secs(2));
        let addr = server.local_addr().unwrap();

        let mut sink = LogEventSink::new();
        let mut app = AppService::new(config, Some(server));
        app.start(&mut hw, &mut sink);
        Self {
            app,
            wifi,
            hw,
            sink,
            addr,
            now_ms: 0,
        }
    }

    fn tick_at(&mut self, now_ms: u32) -> usize {
        self.now_ms = now_ms;
        self.app
            .tick(now_ms, &self.wifi, &mut self.hw, &mut self.sink)
            .requests_served
    }

    /// Send `raw` and keep ticking at the current clock until it is served.
    fn request(&mut self, raw: &'static str) -> String {
        let addr = self.addr;
        let client = thread::spawn(move || {
            let mut s = TcpStream::connect(addr).unwrap();
            s.write_all(raw.as_bytes()).unwrap();
            s.shutdown(Shutdown::Write).ok();
            let mut out = String::new();
            s.read_to_string(&mut out).unwrap();
            out
        });
        let mut served = 0;
        for _ in 0..400 {
            served = self.tick_at(self.now_ms);
            if served > 0 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(served, 1, "request was never served");
        client.join().unwrap()
    }
}

fn body(reply: &str) -> &str {
    reply.split_once("\r\n\r\n").map_or("", |(_, b)| b)
}

#[test]
fn toggle_twice_restores_led_through_pin() {
    let mut rig = Rig::boot(Some(0));
    assert!(!rig.app.state().led_on);

    let reply = rig.request("GET /toggle HTTP/1.1\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 302 Found\r\n"));
    assert!(reply.contains("Location: /\r\n"));
    assert!(rig.app.state().led_on);
    assert!(rig.hw.led().is_on());

    rig.request("GET /toggle?again=1 HTTP/1.1\r\n\r\n");
    assert!(!rig.app.state().led_on);
    assert!(!rig.hw.led().is_on());
}

#[test]
fn api_reports_latest_sample() {
    let mut rig = Rig::boot(Some(4095));
    rig.tick_at(5_000);
    assert!(rig.app.state().last_sensor_value.is_some());

    rig.now_ms = 6_250;
    let reply = rig.request("GET /api/sensor HTTP/1.1\r\nAccept: */*\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(reply.contains("Content-Type: application/json\r\n"));

    let v: serde_json::Value = serde_json::from_str(body(&reply)).unwrap();
    assert_eq!(v["timestamp"], 6_250);
    assert_eq!(v["uptime"], 6);
    assert_eq!(v["sensor"]["status"], "ready");
    assert_eq!(v["sensor"]["value"], 100.0);
    assert_eq!(v["sensor"]["last_update"], 1_250);
    assert!(v["free_heap"].as_u64().unwrap() > 0);
}

#[test]
fn api_before_first_sample_reports_no_data() {
    let mut rig = Rig::boot(Some(1000));
    let reply = rig.request("GET /api/sensor HTTP/1.1\r\n\r\n");
    let v: serde_json::Value = serde_json::from_str(body(&reply)).unwrap();
    assert_eq!(v["sensor"], serde_json::json!({ "status": "no_data" }));
    assert_eq!(v["led_state"], false);
}

#[test]
fn dashboard_and_not_found() {
    let mut rig = Rig::boot(Some(0));
    let page = rig.request("GET / HTTP/1.1\r\n\r\n");
    assert!(page.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(page.contains("<a href='/toggle'>"));
    assert!(page.contains("<a href='/api/sensor'>"));

    let missing = rig.request("GET /nope HTTP/1.1\r\n\r\n");
    assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(missing.contains("Content-Type: text/plain"));
    assert_eq!(body(&missing), "Not found");
}

#[test]
fn wrong_method_and_garbage() {
    let mut rig = Rig::boot(Some(0));
    let reply = rig.request("DELETE /toggle HTTP/1.1\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    assert!(!rig.app.state().led_on);

    let reply = rig.request("\x01\x02 nonsense\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}

#[test]
fn idle_ticks_serve_nothing() {
    let mut rig = Rig::boot(None);
    for t in 0..20 {
        assert_eq!(rig.tick_at(t), 0);
    }
}
