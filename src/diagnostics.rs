//! Runtime counters and the fatal-error record.
//!
//! [`SamplerMetrics`] is updated by the state handlers and reported in
//! telemetry.  [`FatalRecord`] is what a bring-up failure leaves behind
//! before the halt; its reason is truncated to fit a fixed-size string so
//! building one never allocates.

use core::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::fsm::StateId;

/// Saturating counters kept across the life of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerMetrics {
    /// Readings written to the ring buffer.
    pub samples_stored: u32,
    /// Readings dropped because the buffer was full.
    pub capacity_exceeded: u32,
    /// Sample entries where the sensor returned an error.
    pub sensor_read_failures: u32,
    /// Returns from the idle wait.
    pub wakeups: u32,
    /// Wake-ups with no pending alarm.
    pub spurious_wakeups: u32,
}

impl SamplerMetrics {
    /// Compact binary encoding into `buf`; returns the used prefix.
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], postcard::Error> {
        postcard::to_slice(self, buf)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

/// Maximum stored length of [`FatalRecord::reason`].
pub const REASON_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatalRecord {
    /// State whose entry action failed.
    pub state: StateId,
    /// FSM tick count at the failure.
    pub tick: u64,
    pub reason: heapless::String<REASON_CAPACITY>,
}

impl FatalRecord {
    pub fn new(state: StateId, tick: u64, reason: &impl fmt::Display) -> Self {
        let mut out = Truncating(heapless::String::new());
        let _ = write!(out, "{reason}");
        Self {
            state,
            tick,
            reason: out.0,
        }
    }
}

/// `fmt::Write` sink that keeps whatever fits and drops the rest.
struct Truncating(heapless::String<REASON_CAPACITY>);

impl Write for Truncating {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}
