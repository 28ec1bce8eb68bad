//! One-shot platform bring-up.
//!
//! Enables automatic light sleep through the ESP-IDF power-management
//! driver, so that a task blocked in [`IdleDriver::wait`](super::idle::IdleDriver::wait)
//! lets the core drop into light sleep until the next timer or peripheral
//! interrupt.  Called once from the Boot state before the timer is armed.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot platform initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    /// `esp_pm_configure` rejected the configuration (platform return code).
    PowerConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PowerConfigFailed(rc) => write!(f, "power management config failed (rc={})", rc),
        }
    }
}

/// CPU frequency while running.
#[cfg(target_os = "espidf")]
const MAX_CPU_FREQ_MHZ: i32 = 160;
/// CPU frequency floor between wake-ups.
#[cfg(target_os = "espidf")]
const MIN_CPU_FREQ_MHZ: i32 = 40;

#[cfg(target_os = "espidf")]
pub fn init_platform() -> Result<(), HwInitError> {
    let cfg = esp_pm_config_t {
        max_freq_mhz: MAX_CPU_FREQ_MHZ,
        min_freq_mhz: MIN_CPU_FREQ_MHZ,
        light_sleep_enable: true,
    };
    // SAFETY: `cfg` outlives the call; esp_pm_configure copies it.  Called
    // once from the loop task before any timer is running.
    let ret = unsafe { esp_pm_configure((&raw const cfg).cast()) };
    if ret != ESP_OK as esp_err_t {
        return Err(HwInitError::PowerConfigFailed(ret));
    }
    log::info!(
        "hw_init: automatic light sleep enabled ({}-{} MHz)",
        MIN_CPU_FREQ_MHZ, MAX_CPU_FREQ_MHZ
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_platform() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): power management not configured");
    Ok(())
}
