//! Low-power wait for "any interrupt".
//!
//! The loop parks in [`IdleDriver::wait`]; any context holding a
//! [`WakeHandle`] can end the wait.  Both implementations latch: a wake
//! raised while the loop is still busy makes the next `wait` return at
//! once, the same way a WFE event register does.
//!
//! On ESP-IDF: a FreeRTOS task notification on the loop task.
//! On host/test: a flag + condvar pair.

use std::sync::Arc;

// ---------------------------------------------------------------------------
// ESP-IDF
// ---------------------------------------------------------------------------

#[cfg(target_os = "espidf")]
use core::num::NonZeroU32;

#[cfg(target_os = "espidf")]
use esp_idf_hal::delay::BLOCK;
#[cfg(target_os = "espidf")]
use esp_idf_hal::task::notification::{Notification, Notifier};

/// Cloneable handle that ends the loop's idle wait.
#[cfg(target_os = "espidf")]
#[derive(Clone)]
pub struct WakeHandle(Arc<Notifier>);

#[cfg(target_os = "espidf")]
impl WakeHandle {
    pub fn wake(&self) {
        // SAFETY: the notifier targets the loop task, which lives for the
        // whole program; notifying from the esp_timer task is allowed.
        unsafe {
            self.0.notify_and_yield(NonZeroU32::MIN);
        }
    }
}

/// Idle driver bound to the task that constructs it.
#[cfg(target_os = "espidf")]
pub struct IdleDriver {
    notification: Notification,
}

#[cfg(target_os = "espidf")]
impl IdleDriver {
    /// Must be called from the loop task: the notification targets the caller.
    pub fn new() -> Self {
        Self {
            notification: Notification::new(),
        }
    }

    pub fn wake_handle(&self) -> WakeHandle {
        WakeHandle(self.notification.notifier())
    }

    /// Block the task until notified.  With automatic light sleep enabled
    /// the core sleeps for the duration.
    pub fn wait(&mut self) {
        let _ = self.notification.wait(BLOCK);
    }
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------

#[cfg(not(target_os = "espidf"))]
use std::sync::{Condvar, Mutex, PoisonError};

/// Latched interrupt line.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct InterruptLine {
    raised: Mutex<bool>,
    cv: Condvar,
}

#[cfg(not(target_os = "espidf"))]
impl InterruptLine {
    pub fn raise(&self) {
        *self.raised.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.cv.notify_one();
    }

    /// Block until raised, then clear.
    pub fn wait(&self) {
        let guard = self.raised.lock().unwrap_or_else(PoisonError::into_inner);
        let mut raised = self
            .cv
            .wait_while(guard, |raised| !*raised)
            .unwrap_or_else(PoisonError::into_inner);
        *raised = false;
    }

    pub fn is_raised(&self) -> bool {
        *self.raised.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable handle that ends the loop's idle wait.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone)]
pub struct WakeHandle(Arc<InterruptLine>);

#[cfg(not(target_os = "espidf"))]
impl WakeHandle {
    pub fn wake(&self) {
        self.0.raise();
    }
}

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct IdleDriver {
    line: Arc<InterruptLine>,
}

#[cfg(not(target_os = "espidf"))]
impl IdleDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wake_handle(&self) -> WakeHandle {
        WakeHandle(Arc::clone(&self.line))
    }

    pub fn wait(&mut self) {
        self.line.wait();
    }
}
