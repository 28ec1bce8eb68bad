//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the temperature sensor, the wake-up alarm and the idle driver,
//! exposing them through every port the sampling state machine needs.
//! On non-espidf targets the drivers underneath are thread/condvar
//! simulations and the sensor is normally a LIS2DE12 on a simulated bus.

use std::sync::Arc;

use crate::app::ports::{AlarmPort, HaltPort, IdlePort, PlatformPort, SensorPort};
use crate::bridge::AlarmBridge;
use crate::diagnostics::FatalRecord;
use crate::drivers::hw_timer::AlarmDriver;
use crate::drivers::idle::{IdleDriver, WakeHandle};
use crate::drivers::{halt, hw_init};
use crate::error::{Error, SensorError, TimerError};
use crate::sensors::Sample;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<S> {
    sensor: S,
    alarm: AlarmDriver,
    idle: IdleDriver,
}

impl<S: SensorPort> HardwareAdapter<S> {
    /// On ESP-IDF this must run on the loop task: the idle driver binds to
    /// the constructing task.
    pub fn new(sensor: S) -> Self {
        let idle = IdleDriver::new();
        let alarm = AlarmDriver::new(idle.wake_handle());
        Self {
            sensor,
            alarm,
            idle,
        }
    }

    /// Handle for raising the idle wake from other interrupt sources.
    pub fn wake_handle(&self) -> WakeHandle {
        self.idle.wake_handle()
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}

// ── PlatformPort implementation ───────────────────────────────

impl<S> PlatformPort for HardwareAdapter<S> {
    fn init_platform(&mut self) -> Result<(), Error> {
        hw_init::init_platform()?;
        Ok(())
    }
}

// ── AlarmPort implementation ──────────────────────────────────

impl<S> AlarmPort for HardwareAdapter<S> {
    fn init_timer(&mut self) -> Result<(), TimerError> {
        self.alarm.init()
    }

    fn set_periodic_alarm(
        &mut self,
        period_ms: u32,
        bridge: Arc<AlarmBridge>,
    ) -> Result<(), TimerError> {
        self.alarm.start_periodic(period_ms, bridge)
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<S: SensorPort> SensorPort for HardwareAdapter<S> {
    fn init_sensor(&mut self) -> Result<(), SensorError> {
        self.sensor.init_sensor()
    }

    fn enable_temperature_reporting(&mut self) -> Result<(), SensorError> {
        self.sensor.enable_temperature_reporting()
    }

    fn read_temperature(&mut self) -> Result<Sample, SensorError> {
        self.sensor.read_temperature()
    }
}

// ── IdlePort / HaltPort implementation ────────────────────────

impl<S> IdlePort for HardwareAdapter<S> {
    fn wait_for_interrupt(&mut self) {
        self.idle.wait();
    }
}

impl<S> HaltPort for HardwareAdapter<S> {
    fn halt(&mut self, record: &FatalRecord) -> ! {
        self.alarm.stop();
        halt::halt(record)
    }
}
