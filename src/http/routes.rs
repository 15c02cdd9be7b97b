//! Route table and handlers.
//!
//! Handlers borrow the device record and the hardware ports for the
//! duration of one request; nothing here outlives the call.

use core::fmt::Write as _;

use serde::Serialize;

use crate::app::ports::HardwarePort;
use crate::app::state::DeviceState;
use crate::config::PROJECT_NAME;

use super::{Method, Request, Response, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Toggle,
    ApiSensor,
    NotFound,
}

impl Route {
    /// Match a request path.  The query string plays no part in routing.
    pub fn resolve(path: &str) -> Self {
        let path = path.split_once('?').map_or(path, |(p, _)| p);
        match path {
            "/" => Self::Root,
            "/toggle" => Self::Toggle,
            "/api/sensor" => Self::ApiSensor,
            _ => Self::NotFound,
        }
    }
}

/// Dispatch one parsed request.
pub fn handle<H: HardwarePort>(
    req: &Request,
    state: &mut DeviceState,
    hw: &mut H,
    now_ms: u32,
) -> Response {
    let route = Route::resolve(&req.path);
    if route == Route::NotFound {
        return not_found();
    }
    if req.method != Method::Get {
        return Response::text(Status::MethodNotAllowed, "Method not allowed");
    }
    match route {
        Route::Root => Response::html(render_root(state, &*hw, now_ms)),
        Route::Toggle => toggle(state, hw),
        Route::ApiSensor => api_sensor(state, &*hw, now_ms),
        Route::NotFound => not_found(),
    }
}

pub fn not_found() -> Response {
    Response::text(Status::NotFound, "Not found")
}

pub fn bad_request() -> Response {
    Response::text(Status::BadRequest, "Bad request")
}

fn toggle<H: HardwarePort>(state: &mut DeviceState, hw: &mut H) -> Response {
    let on = state.toggle_led(hw);
    log::info!("HTTP | /toggle | led={}", if on { "ON" } else { "OFF" });
    Response::redirect("/")
}

// ── Dashboard ─────────────────────────────────────────────────

const PAGE_STYLE: &str = "body{font-family:Arial;margin:40px;} \
.card{background:#f0f0f0;padding:20px;margin:10px;border-radius:5px;}";

pub fn render_root<H: HardwarePort>(state: &DeviceState, hw: &H, now_ms: u32) -> String {
    let mut html = String::with_capacity(1024);

    // Writing into a String cannot fail.
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><title>{PROJECT_NAME} Dashboard</title>\
         <meta http-equiv='refresh' content='5'><style>{PAGE_STYLE}</style>\
         </head><body><h1>{PROJECT_NAME} Dashboard</h1>"
    );
    match (hw.is_ready(), state.last_sensor_value) {
        (true, Some(value)) => {
            let age_secs = state.sensor_age_ms(now_ms).unwrap_or(0) / 1000;
            let _ = write!(
                html,
                "<div class='card'><h2>Sensor Reading</h2>\
                 <p>Current Value: {value:.2}%</p>\
                 <p>Last Update: {age_secs} seconds ago</p></div>"
            );
        }
        (true, None) => {
            html.push_str("<div class='card'><h2>Sensor Reading</h2><p>Waiting for first sample</p></div>");
        }
        (false, _) => {
            html.push_str("<div class='card'><p>Sensor not initialized</p></div>");
        }
    }

    let _ = write!(
        html,
        "<div class='card'><h2>System Status</h2>\
         <p>LED State: {}</p>\
         <p>Uptime: {} seconds</p>\
         <p>Free Heap: {} bytes</p>\
         <p><a href='/toggle'>Toggle LED</a> | <a href='/api/sensor'>JSON API</a></p></div>",
        if state.led_on { "ON" } else { "OFF" },
        state.uptime_secs(),
        hw.free_heap(),
    );
    html.push_str("</body></html>");
    html
}

// ── JSON API ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SensorApiResponse {
    /// Clock reading at response time, ms.
    pub timestamp: u32,
    /// Seconds since boot.  Unlike `timestamp`, this does not wrap.
    pub uptime: u64,
    pub led_state: bool,
    pub free_heap: u32,
    pub sensor: SensorField,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SensorField {
    Ready {
        value: f32,
        /// Milliseconds since the sample was taken.
        last_update: u32,
        status: &'static str,
    },
    Status {
        status: &'static str,
    },
}

impl SensorApiResponse {
    pub fn snapshot<H: HardwarePort>(state: &DeviceState, hw: &H, now_ms: u32) -> Self {
        let sensor = match (hw.is_ready(), state.last_sensor_value) {
            (true, Some(value)) => SensorField::Ready {
                value,
                last_update: state.sensor_age_ms(now_ms).unwrap_or(0),
                status: "ready",
            },
            (true, None) => SensorField::Status { status: "no_data" },
            (false, _) => SensorField::Status {
                status: "not_initialized",
            },
        };
        Self {
            timestamp: now_ms,
            uptime: state.uptime_secs(),
            led_state: state.led_on,
            free_heap: hw.free_heap(),
            sensor,
        }
    }
}

fn api_sensor<H: HardwarePort>(state: &DeviceState, hw: &H, now_ms: u32) -> Response {
    match serde_json::to_string(&SensorApiResponse::snapshot(state, hw, now_ms)) {
        Ok(body) => Response::json(body),
        Err(e) => {
            log::error!("HTTP | /api/sensor | serialise failed: {}", e);
            Response::text(Status::InternalServerError, "Internal error")
        }
    }
}
