//! Unified error types for the Thermolog firmware.
//!
//! A single `Error` enum that every subsystem converts into, so bring-up
//! failures funnel into one halt path.  All variants are `Copy` so they can
//! be passed through the FSM and into a [`FatalRecord`](crate::diagnostics::FatalRecord)
//! without allocation.

use core::fmt;

use embedded_hal::i2c::ErrorKind;

use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The temperature sensor failed to initialise or to produce a reading.
    Sensor(SensorError),
    /// The wake-up timer could not be initialised or armed.
    Timer(TimerError),
    /// A ring buffer operation was rejected.
    Buffer(BufferError),
    /// Platform bring-up (clocks, power management) failed.
    Platform(HwInitError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Timer(e) => write!(f, "timer: {e}"),
            Self::Buffer(e) => write!(f, "buffer: {e}"),
            Self::Platform(e) => write!(f, "platform: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The I2C transaction failed.
    Bus(ErrorKind),
    /// WHO_AM_I returned something other than the expected identity.
    UnexpectedDevice(u8),
    /// Temperature reporting has not been enabled yet.
    NotEnabled,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(kind) => write!(f, "I2C bus error ({kind})"),
            Self::UnexpectedDevice(id) => write!(f, "unexpected device id 0x{id:02X}"),
            Self::NotEnabled => write!(f, "temperature reporting not enabled"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Timer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The timer peripheral could not be created (platform return code).
    InitFailed(i32),
    /// The periodic alarm could not be started (platform return code).
    ArmFailed(i32),
    /// `set_periodic_alarm` was called before `init_timer`.
    NotInitialised,
    /// A zero period can never expire.
    InvalidPeriod,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitFailed(rc) => write!(f, "timer init failed (rc={rc})"),
            Self::ArmFailed(rc) => write!(f, "periodic alarm start failed (rc={rc})"),
            Self::NotInitialised => write!(f, "timer not initialised"),
            Self::InvalidPeriod => write!(f, "alarm period must be non-zero"),
        }
    }
}

impl From<TimerError> for Error {
    fn from(e: TimerError) -> Self {
        Self::Timer(e)
    }
}

// ---------------------------------------------------------------------------
// Buffer errors
// ---------------------------------------------------------------------------

/// Rejections from [`RingBuffer`](crate::ring_buffer::RingBuffer).
///
/// `CapacityExceeded` and `Underflow` leave the buffer untouched; the caller
/// decides whether to drop or retry.  `TooSmall` is a programming error and
/// is treated as fatal by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// Storage is smaller than the minimum usable capacity.
    TooSmall { capacity: usize },
    /// Not enough free space for the whole write.
    CapacityExceeded { requested: usize, free: usize },
    /// Not enough stored bytes for the whole read.
    Underflow { requested: usize, available: usize },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { capacity } => {
                write!(f, "storage of {capacity} bytes is below the minimum capacity")
            }
            Self::CapacityExceeded { requested, free } => {
                write!(f, "capacity exceeded ({requested} bytes requested, {free} free)")
            }
            Self::Underflow {
                requested,
                available,
            } => write!(f, "underflow ({requested} bytes requested, {available} stored)"),
        }
    }
}

impl From<BufferError> for Error {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Platform(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
