//! Shared mutable context threaded through every FSM handler.
//!
//! `SamplerContext` is the single struct that state handlers read from and
//! write to.  It owns the hardware ports, the sample buffer, the loop side
//! of the alarm bridge, configuration and the running counters.

use std::sync::Arc;

use crate::bridge::AlarmBridge;
use crate::config::SystemConfig;
use crate::diagnostics::SamplerMetrics;
use crate::error::{BufferError, SensorError};
use crate::ring_buffer::RingBuffer;
use crate::sensors::Sample;

/// What the most recent Sample entry did with its reading.
///
/// Written by the Sample state, taken by the service after each tick so it
/// can report the outcome through the event sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Reading written to the buffer.
    Stored(Sample),
    /// Reading taken but the buffer had no room for it.
    Dropped(Sample, BufferError),
    /// The sensor did not produce a reading.
    ReadFailed(SensorError),
}

/// The shared context passed to every state handler function.
pub struct SamplerContext<'buf, H> {
    // -- Collaborators --
    /// Platform, alarm, sensor, idle and halt ports.
    pub hw: H,
    /// Destination for every stored sample.  Written only from Sample.
    pub buffer: RingBuffer<'buf>,
    /// Loop side of the alarm hand-off.  The alarm side gets a clone in Boot.
    pub bridge: Arc<AlarmBridge>,

    // -- Configuration --
    pub config: SystemConfig,

    // -- Diagnostics --
    pub metrics: SamplerMetrics,
    /// Result of the last Sample entry, until the service takes it.
    pub outcome: Option<SampleOutcome>,

    // -- Timing --
    /// Monotonic total tick count.
    pub total_ticks: u64,
}

impl<'buf, H> SamplerContext<'buf, H> {
    pub fn new(
        config: SystemConfig,
        hw: H,
        buffer: RingBuffer<'buf>,
        bridge: Arc<AlarmBridge>,
    ) -> Self {
        Self {
            hw,
            buffer,
            bridge,
            config,
            metrics: SamplerMetrics::default(),
            outcome: None,
            total_ticks: 0,
        }
    }
}
