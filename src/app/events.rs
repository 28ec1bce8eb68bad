//! Outbound application events.
//!
//! The [`SamplerService`](super::service::SamplerService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use serde::Serialize;

use crate::diagnostics::SamplerMetrics;
use crate::error::SensorError;
use crate::fsm::StateId;
use crate::sensors::Sample;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplerEvent {
    /// The service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A reading was written to the buffer.
    SampleStored { sample: Sample, buffered_bytes: usize },

    /// A reading was taken but the buffer was full.
    SampleDropped { sample: Sample, free_bytes: usize },

    /// The sensor did not produce a reading.
    SensorReadFailed(SensorError),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryData {
    pub state: StateId,
    pub last_sample: Option<Sample>,
    pub buffered_bytes: usize,
    pub capacity_bytes: usize,
    pub metrics: SamplerMetrics,
}
