//! Interrupt-to-loop alarm bridge.
//!
//! The periodic alarm fires in interrupt context and preempts the sampling
//! loop at arbitrary points.  The only thing the two contexts share is one
//! atomic byte holding the *desired next wake state*:
//!
//! ```text
//! ┌───────────────┐  store(Sample)  ┌─────────────┐  swap(Idle)  ┌───────────┐
//! │ Alarm ISR     │────────────────▶│  AtomicU8   │─────────────▶│ Main loop │
//! │ (signal only) │                 │ (one slot)  │              │ (Idle)    │
//! └───────────────┘                 └─────────────┘              └───────────┘
//! ```
//!
//! The handler side does exactly one unconditional store and nothing else:
//! no read-modify-write, so there is nothing to race against.  The loop side
//! consumes the slot with a single swap.  Several firings before the loop
//! looks collapse into one pending `Sample`.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::fsm::StateId;

/// Single-slot, lock-free hand-off between the alarm handler and the loop.
#[derive(Debug)]
pub struct AlarmBridge {
    cell: AtomicU8,
}

impl AlarmBridge {
    pub const fn new() -> Self {
        Self {
            cell: AtomicU8::new(StateId::Idle as u8),
        }
    }

    /// Record that the alarm fired.  Interrupt context.
    ///
    /// One unconditional store; never blocks, never reads.
    #[inline]
    pub fn signal(&self) {
        self.cell.store(StateId::Sample as u8, Ordering::Release);
    }

    /// Read the wake state once and clear it.  Loop context.
    ///
    /// Returns [`StateId::Sample`] if at least one alarm fired since the
    /// previous call, [`StateId::Idle`] otherwise.
    pub fn observe(&self) -> StateId {
        let raw = self.cell.swap(StateId::Idle as u8, Ordering::AcqRel);
        StateId::from_index(raw as usize)
    }

    /// Whether an alarm is waiting to be observed, without consuming it.
    pub fn is_pending(&self) -> bool {
        self.cell.load(Ordering::Acquire) == StateId::Sample as u8
    }
}

impl Default for AlarmBridge {
    fn default() -> Self {
        Self::new()
    }
}
