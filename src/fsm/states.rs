//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers, instantiated per hardware
//! type.  No closures, no dynamic dispatch.
//!
//! ```text
//!  BOOT ──▶ SENSOR_INIT ──▶ SAMPLE ──▶ IDLE
//!                             ▲          │
//!                             └─[alarm]──┘
//!
//!  BOOT / SENSOR_INIT ──[bring-up failure]──▶ halt (never returns)
//! ```

use std::sync::Arc;

use log::{error, info, warn};

use super::context::{SampleOutcome, SamplerContext};
use super::{StateDescriptor, StateId};
use crate::app::ports::Hardware;
use crate::diagnostics::FatalRecord;
use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table for hardware `H`.  Called once at startup.
pub fn build_state_table<'buf, H: Hardware>() -> [StateDescriptor<'buf, H>; StateId::COUNT] {
    [
        // Index 0: Boot
        StateDescriptor {
            id: StateId::Boot,
            name: "Boot",
            on_enter: Some(boot_enter::<H>),
            on_update: boot_update::<H>,
        },
        // Index 1: SensorInit
        StateDescriptor {
            id: StateId::SensorInit,
            name: "SensorInit",
            on_enter: Some(sensor_init_enter::<H>),
            on_update: sensor_init_update::<H>,
        },
        // Index 2: Sample
        StateDescriptor {
            id: StateId::Sample,
            name: "Sample",
            on_enter: Some(sample_enter::<H>),
            on_update: sample_update::<H>,
        },
        // Index 3: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: None,
            on_update: idle_update::<H>,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Fatal path
// ═══════════════════════════════════════════════════════════════════════════

/// Log, record and halt.  Bring-up cannot be retried from here.
fn fatal<H: Hardware>(ctx: &mut SamplerContext<'_, H>, state: StateId, err: Error) -> ! {
    error!("{state:?}: fatal: {err}");
    let record = FatalRecord::new(state, ctx.total_ticks, &err);
    ctx.hw.halt(&record)
}

// ═══════════════════════════════════════════════════════════════════════════
//  BOOT state: platform, timer and periodic alarm
// ═══════════════════════════════════════════════════════════════════════════

fn boot_enter<H: Hardware>(ctx: &mut SamplerContext<'_, H>) {
    if let Err(e) = bring_up_platform(ctx) {
        fatal(ctx, StateId::Boot, e);
    }
    info!(
        "BOOT: periodic alarm armed every {} ms",
        ctx.config.sample_period_ms
    );
}

fn bring_up_platform<H: Hardware>(ctx: &mut SamplerContext<'_, H>) -> Result<()> {
    ctx.hw.init_platform()?;
    ctx.hw.init_timer()?;
    ctx.hw
        .set_periodic_alarm(ctx.config.sample_period_ms, Arc::clone(&ctx.bridge))?;
    Ok(())
}

fn boot_update<H: Hardware>(_ctx: &mut SamplerContext<'_, H>) -> Option<StateId> {
    Some(StateId::SensorInit)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SENSOR_INIT state: identity check and temperature channel
// ═══════════════════════════════════════════════════════════════════════════

fn sensor_init_enter<H: Hardware>(ctx: &mut SamplerContext<'_, H>) {
    let result = ctx
        .hw
        .init_sensor()
        .and_then(|()| ctx.hw.enable_temperature_reporting());
    if let Err(e) = result {
        fatal(ctx, StateId::SensorInit, e.into());
    }
    info!("SENSOR_INIT: temperature reporting enabled");
}

fn sensor_init_update<H: Hardware>(_ctx: &mut SamplerContext<'_, H>) -> Option<StateId> {
    Some(StateId::Sample)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SAMPLE state: one reading into the buffer
// ═══════════════════════════════════════════════════════════════════════════

fn sample_enter<H: Hardware>(ctx: &mut SamplerContext<'_, H>) {
    let outcome = match ctx.hw.read_temperature() {
        Ok(sample) => match ctx.buffer.write(&sample.to_le_bytes()) {
            Ok(()) => {
                ctx.metrics.samples_stored = ctx.metrics.samples_stored.saturating_add(1);
                SampleOutcome::Stored(sample)
            }
            Err(e) => {
                ctx.metrics.capacity_exceeded = ctx.metrics.capacity_exceeded.saturating_add(1);
                warn!("SAMPLE: dropped {sample:?}: {e}");
                SampleOutcome::Dropped(sample, e)
            }
        },
        Err(e) => {
            ctx.metrics.sensor_read_failures = ctx.metrics.sensor_read_failures.saturating_add(1);
            warn!("SAMPLE: sensor read failed: {e}");
            SampleOutcome::ReadFailed(e)
        }
    };
    ctx.outcome = Some(outcome);
}

fn sample_update<H: Hardware>(_ctx: &mut SamplerContext<'_, H>) -> Option<StateId> {
    Some(StateId::Idle)
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state: sleep until an interrupt, sample if it was the alarm
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update<H: Hardware>(ctx: &mut SamplerContext<'_, H>) -> Option<StateId> {
    ctx.hw.wait_for_interrupt();
    ctx.metrics.wakeups = ctx.metrics.wakeups.saturating_add(1);

    match ctx.bridge.observe() {
        StateId::Sample => Some(StateId::Sample),
        _ => {
            ctx.metrics.spurious_wakeups = ctx.metrics.spurious_wakeups.saturating_add(1);
            None
        }
    }
}
