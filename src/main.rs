//! LedBeacon Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter     LogEventSink   Esp32Time    WifiAdapter   │
//! │  (LED+Sensor+Heap)   (EventSink)    (Clock)      (Connectivity)│
//! │  HttpServer (RequestDispatcher)                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │         AppService (cooperative scheduler loop)        │    │
//! │  │  web · sensor sampling · blink · status report         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyOutputPin, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use ledbeacon::adapters::hardware::HardwareAdapter;
use ledbeacon::adapters::log_sink::LogEventSink;
use ledbeacon::adapters::time::Esp32TimeAdapter;
use ledbeacon::adapters::wifi::{RetryPolicy, WifiAdapter, connect_with_retry};
use ledbeacon::app::service::AppService;
use ledbeacon::config::{self, DeviceConfig};
use ledbeacon::drivers::status_led::StatusLed;
use ledbeacon::drivers::watchdog::Watchdog;
use ledbeacon::http::server::HttpServer;
use ledbeacon::pins;
use ledbeacon::sensors::analog::AnalogSensor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let config = DeviceConfig::default();
    config.validate().context("invalid device configuration")?;
    log::set_max_level(config.log_level);

    info!("╔══════════════════════════════════════╗");
    info!("║  {} v{}                      ║", config::PROJECT_NAME, env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    info!("Serial console at {} baud", config::SERIAL_BAUD);

    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 2. LED + sensor ───────────────────────────────────────
    // SAFETY: LED_GPIO is not claimed by any other driver.
    let led_pin = PinDriver::output(unsafe { AnyOutputPin::new(pins::LED_GPIO) })
        .context("LED pin setup")?;
    let led = StatusLed::new(led_pin, config.led_active_high);

    let mut sensor = AnalogSensor::new(pins::SENSOR_ADC_CHANNEL);
    if config.sensor_enabled {
        match sensor.begin() {
            Ok(()) => info!("Sensor initialised (GPIO{})", pins::SENSOR_ADC_GPIO),
            Err(e) => warn!("Sensor initialisation failed: {}", e),
        }
    } else {
        info!("Sensor disabled by configuration");
    }
    let mut hw = HardwareAdapter::new(led, sensor);

    // ── 3. WiFi (bounded retries, then offline for good) ──────
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, Some(nvs)).context("WiFi driver init")?;
    let web = match wifi.set_credentials(config::WIFI_SSID, config::WIFI_PASSWORD) {
        Ok(()) => match connect_with_retry(&mut wifi, &RetryPolicy::from_config(&config), FreeRtos::delay_ms) {
            Ok(ip) => match HttpServer::bind(config.http_port) {
                Ok(server) => {
                    info!("Web server started");
                    info!("Visit http://{} in your browser", ip);
                    Some(server)
                }
                Err(e) => {
                    warn!("{} - running in offline mode", e);
                    None
                }
            },
            Err(e) => {
                warn!("WiFi connection failed ({}) - running in offline mode", e);
                None
            }
        },
        Err(e) => {
            warn!("WiFi credentials rejected ({}) - running in offline mode", e);
            None
        }
    };

    // ── 4. Scheduler loop ─────────────────────────────────────
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let loop_delay_ms = config.loop_delay_ms;

    info!("Setup complete! Blinking every {}ms", config.blink_interval_ms);

    let mut app = AppService::new(config, web);
    app.start(&mut hw, &mut sink);
    app.run_forever(&clock, &wifi, &mut hw, &mut sink, || {
        watchdog.feed();
        watchdog.yield_for(loop_delay_ms);
    })
}
