//! Application service: the hexagonal core.
//!
//! [`SamplerService`] owns the FSM and its shared context, including the
//! hardware ports and the sample buffer.  It exposes a hardware-agnostic
//! lifecycle (`start` / `tick` / `run`) and reports what happened through an
//! [`EventSink`].
//!
//! ```text
//!  PlatformPort ─┐
//!  AlarmPort ────┤   ┌────────────────────────┐
//!  SensorPort ───┼──▶│     SamplerService      │──▶ EventSink
//!  IdlePort ─────┤   │  FSM · RingBuffer       │
//!  HaltPort ─────┘   └────────────────────────┘
//! ```

use std::sync::Arc;

use log::info;

use crate::bridge::AlarmBridge;
use crate::config::SystemConfig;
use crate::diagnostics::SamplerMetrics;
use crate::fsm::context::{SampleOutcome, SamplerContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::ring_buffer::RingBuffer;
use crate::sensors::Sample;

use super::events::{SamplerEvent, TelemetryData};
use super::ports::{EventSink, Hardware};

// ───────────────────────────────────────────────────────────────
// SamplerService
// ───────────────────────────────────────────────────────────────

/// Periodic temperature sampler.
pub struct SamplerService<'buf, H> {
    fsm: Fsm<'buf, H>,
    ctx: SamplerContext<'buf, H>,
    last_sample: Option<Sample>,
}

impl<'buf, H: Hardware> SamplerService<'buf, H> {
    /// Construct the service with a fresh alarm bridge.
    ///
    /// Does **not** start the FSM: call [`start`](Self::start) or
    /// [`run`](Self::run) next.
    pub fn new(config: SystemConfig, hw: H, buffer: RingBuffer<'buf>) -> Self {
        Self::with_bridge(config, hw, buffer, Arc::new(AlarmBridge::new()))
    }

    /// Construct the service around an existing bridge (e.g. one a test
    /// already holds a handle to).
    pub fn with_bridge(
        config: SystemConfig,
        hw: H,
        buffer: RingBuffer<'buf>,
        bridge: Arc<AlarmBridge>,
    ) -> Self {
        let ctx = SamplerContext::new(config, hw, buffer, bridge);
        let fsm = Fsm::new(build_state_table(), StateId::Boot);
        Self {
            fsm,
            ctx,
            last_sample: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter Boot: platform bring-up and alarm arming.  Halts on failure.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&SamplerEvent::Started(self.fsm.current_state()));
        info!("SamplerService started in {:?}", self.fsm.current_state());
    }

    /// Run one loop iteration.
    ///
    /// In Idle this blocks in [`IdlePort::wait_for_interrupt`](super::ports::IdlePort::wait_for_interrupt).
    pub fn tick(&mut self, sink: &mut impl EventSink) {
        let prev_state = self.fsm.current_state();

        self.fsm.tick(&mut self.ctx);

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&SamplerEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }

        if let Some(outcome) = self.ctx.outcome.take() {
            self.report_outcome(outcome, sink);
        }
    }

    /// Start and loop forever.
    pub fn run(&mut self, sink: &mut impl EventSink) -> ! {
        self.start(sink);
        loop {
            self.tick(sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.fsm.ticks_in_current_state()
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.ctx.metrics
    }

    pub fn buffer(&self) -> &RingBuffer<'buf> {
        &self.ctx.buffer
    }

    /// Mutable buffer access for a drain path running in loop context.
    pub fn buffer_mut(&mut self) -> &mut RingBuffer<'buf> {
        &mut self.ctx.buffer
    }

    /// Handle to the alarm bridge shared with the alarm handler.
    pub fn bridge(&self) -> Arc<AlarmBridge> {
        Arc::clone(&self.ctx.bridge)
    }

    pub fn hardware(&self) -> &H {
        &self.ctx.hw
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.ctx.hw
    }

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.fsm.current_state(),
            last_sample: self.last_sample,
            buffered_bytes: self.ctx.buffer.len(),
            capacity_bytes: self.ctx.buffer.capacity(),
            metrics: self.ctx.metrics,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn report_outcome(&mut self, outcome: SampleOutcome, sink: &mut impl EventSink) {
        match outcome {
            SampleOutcome::Stored(sample) => {
                self.last_sample = Some(sample);
                sink.emit(&SamplerEvent::SampleStored {
                    sample,
                    buffered_bytes: self.ctx.buffer.len(),
                });
                if self.telemetry_due() {
                    sink.emit(&SamplerEvent::Telemetry(self.build_telemetry()));
                }
            }
            SampleOutcome::Dropped(sample, _) => {
                self.last_sample = Some(sample);
                sink.emit(&SamplerEvent::SampleDropped {
                    sample,
                    free_bytes: self.ctx.buffer.free(),
                });
            }
            SampleOutcome::ReadFailed(e) => {
                sink.emit(&SamplerEvent::SensorReadFailed(e));
            }
        }
    }

    fn telemetry_due(&self) -> bool {
        let every = self.ctx.config.telemetry_every_samples;
        every != 0 && self.ctx.metrics.samples_stored % every == 0
    }
}
