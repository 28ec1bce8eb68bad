//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SamplerService (domain)
//! ```
//!
//! Driven adapters (platform, alarm, sensor, idle, halt, event sinks)
//! implement these traits.  The [`SamplerService`](super::service::SamplerService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and runs unchanged against real peripherals, the host
//! simulation and test doubles.

use std::sync::Arc;

use crate::bridge::AlarmBridge;
use crate::diagnostics::FatalRecord;
use crate::error::{Error, SensorError, TimerError};
use crate::sensors::Sample;

// ───────────────────────────────────────────────────────────────
// Platform port (clocks, power management)
// ───────────────────────────────────────────────────────────────

pub trait PlatformPort {
    /// One-time platform bring-up before any peripheral is touched.
    fn init_platform(&mut self) -> Result<(), Error>;
}

// ───────────────────────────────────────────────────────────────
// Alarm port (wake-up timer)
// ───────────────────────────────────────────────────────────────

/// Periodic wake source.
pub trait AlarmPort {
    /// Prepare the timer peripheral.  Must precede [`set_periodic_alarm`](Self::set_periodic_alarm).
    fn init_timer(&mut self) -> Result<(), TimerError>;

    /// Arm a repeating alarm every `period_ms`.
    ///
    /// Each expiry must call [`AlarmBridge::signal`] on `bridge` and then
    /// wake whatever [`IdlePort::wait_for_interrupt`] is blocked on.  The
    /// alarm handler must do nothing else with shared state.
    fn set_periodic_alarm(
        &mut self,
        period_ms: u32,
        bridge: Arc<AlarmBridge>,
    ) -> Result<(), TimerError>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Temperature source.
pub trait SensorPort {
    /// Probe the device and verify its identity.
    fn init_sensor(&mut self) -> Result<(), SensorError>;

    /// Turn on the temperature channel.
    fn enable_temperature_reporting(&mut self) -> Result<(), SensorError>;

    /// One raw reading.
    fn read_temperature(&mut self) -> Result<Sample, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Idle port (low-power wait)
// ───────────────────────────────────────────────────────────────

pub trait IdlePort {
    /// Suspend until any interrupt occurs.  No timeout.
    ///
    /// Returns immediately if an interrupt arrived since the previous call,
    /// so a wake-up raised just before the wait is never lost.
    fn wait_for_interrupt(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Halt port (fatal configuration errors)
// ───────────────────────────────────────────────────────────────

pub trait HaltPort {
    /// Stop the system for good.
    fn halt(&mut self, record: &FatalRecord) -> !;
}

// ───────────────────────────────────────────────────────────────
// Umbrella
// ───────────────────────────────────────────────────────────────

/// Everything the sampling state machine needs from the outside world.
pub trait Hardware: PlatformPort + AlarmPort + SensorPort + IdlePort + HaltPort {}

impl<T> Hardware for T where T: PlatformPort + AlarmPort + SensorPort + IdlePort + HaltPort {}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`SamplerEvent`](super::events::SamplerEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::SamplerEvent);
}
