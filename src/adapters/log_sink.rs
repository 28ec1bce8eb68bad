//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured sampler events to the
//! logger (UART / USB-CDC in production, stderr in simulation).

use log::{info, warn};

use crate::app::events::SamplerEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`SamplerEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &SamplerEvent) {
        match event {
            SamplerEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            SamplerEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            SamplerEvent::SampleStored {
                sample,
                buffered_bytes,
            } => {
                info!("SAMPLE | raw={} | buffered={}B", sample.raw(), buffered_bytes);
            }
            SamplerEvent::SampleDropped { sample, free_bytes } => {
                warn!("SAMPLE | dropped raw={} | free={}B", sample.raw(), free_bytes);
            }
            SamplerEvent::SensorReadFailed(e) => {
                warn!("SAMPLE | read failed: {}", e);
            }
            SamplerEvent::Telemetry(t) => match serde_json::to_string(t) {
                Ok(json) => info!("TELEM | {}", json),
                Err(e) => warn!("TELEM | encode failed: {}", e),
            },
        }
    }
}
