//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC1 oneshot unit for the analog sensor using raw
//! ESP-IDF sys calls, and exposes the few SoC queries the firmware needs.
//! The LED pin is owned by an `esp_idf_hal` `PinDriver` and configured
//! there, not here.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    AdcChannelFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc)    => write!(f, "ADC1 init failed (rc={})", rc),
            Self::AdcChannelFailed(rc) => write!(f, "ADC1 channel config failed (rc={})", rc),
        }
    }
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_sensor_adc()` completes before the scheduler loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

/// Create the ADC1 oneshot unit (once) and configure `channel` for
/// 12-bit reads over the full 0–3.1 V range.
#[cfg(target_os = "espidf")]
pub fn init_sensor_adc(channel: u32) -> Result<(), HwInitError> {
    // SAFETY: called once from main() before the scheduler loop.
    unsafe {
        if adc1_handle().is_null() {
            let init_cfg = adc_oneshot_unit_init_cfg_t {
                unit_id: adc_unit_t_ADC_UNIT_1,
                ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                ..Default::default()
            };
            // SAFETY: ADC1_HANDLE is only written here, once at boot.
            let ret = adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE);
            if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        let ret = adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg);
        if ret != ESP_OK as i32 { return Err(HwInitError::AdcChannelFailed(ret)); }
    }

    info!("hw_init: ADC1 configured (CH{}=sensor)", channel);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_sensor_adc(_channel: u32) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ADC init skipped");
    Ok(())
}

/// One conversion on `channel`.  `None` if the driver reports an error.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Option<u16> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return None;
    }
    Some(u16::try_from(raw.max(0)).unwrap_or(u16::MAX))
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> Option<u16> {
    None
}

// ── SoC queries ───────────────────────────────────────────────

/// Free heap in bytes.
#[cfg(target_os = "espidf")]
pub fn free_heap_bytes() -> u32 {
    // SAFETY: read-only allocator statistics query.
    unsafe { esp_get_free_heap_size() }
}

/// Free heap in bytes (fixed value in simulation).
#[cfg(not(target_os = "espidf"))]
pub fn free_heap_bytes() -> u32 {
    262_144
}
