//! Periodic wake-up alarm.
//!
//! Every expiry does exactly two things: [`AlarmBridge::signal`] and a wake
//! of the idle loop.  Nothing else in the alarm context touches shared state.
//!
//! On ESP-IDF: an `esp_timer` periodic timer dispatched from the esp_timer
//! task.  On simulation targets: a background thread sleeping `period_ms`.

use std::sync::Arc;

use crate::bridge::AlarmBridge;
use crate::error::TimerError;

use super::idle::WakeHandle;

// ---------------------------------------------------------------------------
// ESP-IDF
// ---------------------------------------------------------------------------

#[cfg(target_os = "espidf")]
use std::sync::OnceLock;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::{info, warn};

/// State reachable from the timer callback through its `arg` pointer.
#[cfg(target_os = "espidf")]
struct AlarmShared {
    bridge: OnceLock<Arc<AlarmBridge>>,
    wake: WakeHandle,
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn alarm_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` points into the `AlarmDriver`'s boxed `AlarmShared`,
    // which outlives the timer (the timer is deleted before the box drops).
    let shared = unsafe { &*arg.cast::<AlarmShared>() };
    if let Some(bridge) = shared.bridge.get() {
        bridge.signal();
        shared.wake.wake();
    }
}

#[cfg(target_os = "espidf")]
pub struct AlarmDriver {
    shared: Box<AlarmShared>,
    handle: esp_timer_handle_t,
}

#[cfg(target_os = "espidf")]
impl AlarmDriver {
    pub fn new(wake: WakeHandle) -> Self {
        Self {
            shared: Box::new(AlarmShared {
                bridge: OnceLock::new(),
                wake,
            }),
            handle: core::ptr::null_mut(),
        }
    }

    /// Create the (stopped) timer.
    pub fn init(&mut self) -> Result<(), TimerError> {
        if !self.handle.is_null() {
            return Ok(());
        }
        let args = esp_timer_create_args_t {
            callback: Some(alarm_cb),
            arg: (&raw const *self.shared).cast_mut().cast(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"sample_alarm".as_ptr(),
            skip_unhandled_events: true,
        };
        // SAFETY: `args` is valid for the call; `handle` is only written here.
        let ret = unsafe { esp_timer_create(&args, &raw mut self.handle) };
        if ret != ESP_OK as esp_err_t {
            return Err(TimerError::InitFailed(ret));
        }
        info!("hw_timer: alarm timer created");
        Ok(())
    }

    /// Start firing every `period_ms`.  The first bridge passed in stays
    /// bound for the life of the driver.
    pub fn start_periodic(
        &mut self,
        period_ms: u32,
        bridge: Arc<AlarmBridge>,
    ) -> Result<(), TimerError> {
        if self.handle.is_null() {
            return Err(TimerError::NotInitialised);
        }
        if period_ms == 0 {
            return Err(TimerError::InvalidPeriod);
        }
        if self.shared.bridge.set(bridge).is_err() {
            warn!("hw_timer: re-arm keeps the original bridge");
        }
        self.stop();
        // SAFETY: `handle` was created by `init` and has not been deleted.
        let ret = unsafe { esp_timer_start_periodic(self.handle, u64::from(period_ms) * 1_000) };
        if ret != ESP_OK as esp_err_t {
            return Err(TimerError::ArmFailed(ret));
        }
        info!("hw_timer: periodic alarm every {} ms", period_ms);
        Ok(())
    }

    pub fn stop(&mut self) {
        if !self.handle.is_null() {
            // SAFETY: valid handle; stopping an idle timer only returns an error code.
            unsafe {
                esp_timer_stop(self.handle);
            }
        }
    }
}

#[cfg(target_os = "espidf")]
impl Drop for AlarmDriver {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            self.stop();
            // SAFETY: stopped above; no callback can run after delete.
            unsafe {
                esp_timer_delete(self.handle);
            }
            self.handle = core::ptr::null_mut();
        }
    }
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------

#[cfg(not(target_os = "espidf"))]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(not(target_os = "espidf"))]
use std::time::Duration;

#[cfg(not(target_os = "espidf"))]
pub struct AlarmDriver {
    wake: WakeHandle,
    initialised: bool,
    /// Stop flag of the running alarm thread.
    running: Option<Arc<AtomicBool>>,
}

#[cfg(not(target_os = "espidf"))]
impl AlarmDriver {
    pub fn new(wake: WakeHandle) -> Self {
        Self {
            wake,
            initialised: false,
            running: None,
        }
    }

    pub fn init(&mut self) -> Result<(), TimerError> {
        self.initialised = true;
        log::info!("hw_timer(sim): thread-backed alarm ready");
        Ok(())
    }

    pub fn start_periodic(
        &mut self,
        period_ms: u32,
        bridge: Arc<AlarmBridge>,
    ) -> Result<(), TimerError> {
        if !self.initialised {
            return Err(TimerError::NotInitialised);
        }
        if period_ms == 0 {
            return Err(TimerError::InvalidPeriod);
        }
        self.stop();

        let stop = Arc::new(AtomicBool::new(false));
        let period = Duration::from_millis(u64::from(period_ms));
        let flag = Arc::clone(&stop);
        let wake = self.wake.clone();
        std::thread::Builder::new()
            .name("sample-alarm".into())
            .spawn(move || {
                loop {
                    std::thread::sleep(period);
                    if flag.load(Ordering::Acquire) {
                        break;
                    }
                    bridge.signal();
                    wake.wake();
                }
            })
            .map_err(|e| TimerError::ArmFailed(e.raw_os_error().unwrap_or(-1)))?;

        self.running = Some(stop);
        log::info!("hw_timer(sim): periodic alarm every {} ms", period_ms);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(flag) = self.running.take() {
            flag.store(true, Ordering::Release);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl Drop for AlarmDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
