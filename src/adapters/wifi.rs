//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`] — the hexagonal boundary for network
//! connectivity — plus the bounded startup connect in
//! [`connect_with_retry`].
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Retry policy
//!
//! The connect is attempted once at boot: `max_attempts` status polls
//! spaced `delay_ms` apart.  If the link is not up by then the adapter is
//! abandoned and the device runs offline until the next reset.  There is
//! no background reconnect.

use core::net::Ipv4Addr;

use log::{debug, info, warn};

use crate::app::ports::{ConnectionState, ConnectivityError, ConnectivityPort};
use crate::config::DeviceConfig;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Retry policy
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_ms: u32,
}

impl RetryPolicy {
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            max_attempts: config.wifi_max_attempts,
            delay_ms: config.wifi_retry_delay_ms,
        }
    }
}

/// Start association and poll until connected or out of attempts.
///
/// `wait` is called with `policy.delay_ms` between polls (FreeRTOS delay
/// on device, a no-op or recorder under test).  On exhaustion the link
/// is [`abandon`](ConnectivityPort::abandon)ed and never retried.
pub fn connect_with_retry(
    link: &mut impl ConnectivityPort,
    policy: &RetryPolicy,
    mut wait: impl FnMut(u32),
) -> Result<Ipv4Addr, ConnectivityError> {
    info!("Connecting to WiFi ({} attempts x {}ms)", policy.max_attempts, policy.delay_ms);
    if let Err(e) = link.begin() {
        link.abandon();
        return Err(e);
    }

    let mut attempts = 0;
    while link.state() != ConnectionState::Connected && attempts < policy.max_attempts {
        wait(policy.delay_ms);
        attempts += 1;
        debug!("WiFi: attempt {}/{}", attempts, policy.max_attempts);
    }

    if link.state() == ConnectionState::Connected {
        let ip = link.local_ip().unwrap_or(Ipv4Addr::UNSPECIFIED);
        info!("WiFi connected! IP address: {}", ip);
        Ok(ip)
    } else {
        link.abandon();
        warn!("WiFi connection failed after {} attempts", attempts);
        Err(ConnectivityError::RetriesExhausted { attempts })
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    started: bool,
    abandoned: bool,
    /// Simulation: the link comes up after this many `state()` polls.
    #[cfg(not(target_os = "espidf"))]
    sim_link_after: Option<u32>,
    #[cfg(not(target_os = "espidf"))]
    sim_polls: core::cell::Cell<u32>,
    #[cfg(not(target_os = "espidf"))]
    sim_stop_fails: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> anyhow::Result<Self> {
        let wifi = EspWifi::new(modem, sysloop, nvs)?;
        Ok(Self {
            wifi,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            started: false,
            abandoned: false,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            started: false,
            abandoned: false,
            sim_link_after: Some(3),
            sim_polls: core::cell::Cell::new(0),
            sim_stop_fails: false,
        }
    }

    /// Simulation: `None` never links, `Some(n)` links after n polls.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_link_after(&mut self, polls: Option<u32>) {
        self.sim_link_after = polls;
    }

    /// Simulation: make the radio refuse to stop.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_stop_fails(&mut self, fails: bool) {
        self.sim_stop_fails = fails;
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    pub fn ssid(&self) -> &str {
        self.ssid.as_str()
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self) -> Result<(), ConnectivityError> {
        self.start_station().map_err(|e| {
            warn!("WiFi: driver start failed: {}", e);
            ConnectivityError::StartFailed
        })
    }

    /// Configure STA mode and start a non-blocking association.
    #[cfg(target_os = "espidf")]
    fn start_station(&mut self) -> Result<(), esp_idf_svc::sys::EspError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        self.wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: self.ssid.clone(),
            password: self.password.clone(),
            auth_method,
            ..Default::default()
        }))?;
        self.wifi.start()?;
        self.wifi.connect()?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self) -> Result<(), ConnectivityError> {
        self.sim_polls.set(0);
        info!("WiFi(sim): associating with '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_linked(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false) && self.platform_ip().is_some()
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_linked(&self) -> bool {
        let polls = self.sim_polls.get().saturating_add(1);
        self.sim_polls.set(polls);
        self.sim_link_after.is_some_and(|after| polls > after)
    }

    #[cfg(target_os = "espidf")]
    fn platform_ip(&self) -> Option<Ipv4Addr> {
        self.wifi
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip)
            .filter(|ip| !ip.is_unspecified())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_ip(&self) -> Option<Ipv4Addr> {
        Some(Ipv4Addr::new(192, 168, 4, 2))
    }

    /// Returns `false` if the radio may still be running.
    #[cfg(target_os = "espidf")]
    fn platform_stop(&mut self) -> bool {
        let mut clean = true;
        if let Err(e) = self.wifi.disconnect() {
            warn!("WiFi: disconnect failed: {}", e);
            clean = false;
        }
        if let Err(e) = self.wifi.stop() {
            warn!("WiFi: stop failed: {}", e);
            clean = false;
        }
        clean
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop(&mut self) -> bool {
        if self.sim_stop_fails {
            warn!("WiFi(sim): stop failed");
            return false;
        }
        info!("WiFi(sim): radio stopped");
        true
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn begin(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        self.platform_begin()?;
        self.started = true;
        self.abandoned = false;
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        if self.abandoned || !self.started {
            ConnectionState::Disconnected
        } else if self.platform_linked() {
            ConnectionState::Connected
        } else {
            ConnectionState::Connecting
        }
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        if self.abandoned || !self.started {
            return None;
        }
        self.platform_ip()
    }

    fn abandon(&mut self) {
        if self.started && !self.platform_stop() {
            warn!("WiFi: radio may still be powered while offline");
        }
        self.started = false;
        self.abandoned = true;
        info!("WiFi: giving up, running offline");
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
