//! Temperature sensing: the [`Sample`] unit and the LIS2DE12 driver.
//!
//! On target the driver talks to the real device over I2C.  On host the
//! same driver runs against [`sim::SimLis2de12Bus`], a register-level
//! model of the part.

pub mod lis2de12;
#[cfg(not(target_os = "espidf"))]
pub mod sim;

use serde::{Deserialize, Serialize};

/// One raw temperature reading.
///
/// Stored in the ring buffer as exactly [`Sample::SIZE`] little-endian
/// bytes, written and read as one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample(pub i16);

impl Sample {
    /// Bytes occupied in the ring buffer.
    pub const SIZE: usize = core::mem::size_of::<i16>();

    pub const fn raw(self) -> i16 {
        self.0
    }

    pub const fn to_le_bytes(self) -> [u8; Self::SIZE] {
        self.0.to_le_bytes()
    }

    pub const fn from_le_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self(i16::from_le_bytes(bytes))
    }
}
