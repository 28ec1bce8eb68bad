//! System configuration parameters
//!
//! All tunable parameters for the Thermolog sampler.  Fixed for the life of
//! a run: the period is armed once in Boot and never changed.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sensors::Sample;
use crate::sensors::lis2de12::{ADDR_SA0_HIGH, ADDR_SA0_LOW};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timing ---
    /// Periodic alarm interval (milliseconds)
    pub sample_period_ms: u32,

    // --- Storage ---
    /// Ring buffer capacity (bytes)
    pub buffer_capacity_bytes: usize,

    // --- Sensor ---
    /// LIS2DE12 7-bit I2C address (0x18 or 0x19, set by SA0)
    pub sensor_i2c_address: u8,

    // --- Reporting ---
    /// Emit a telemetry event every N stored samples (0 = never)
    pub telemetry_every_samples: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            sample_period_ms: 1000, // 1 Hz, matches the sensor ODR
            buffer_capacity_bytes: 128, // 64 samples
            sensor_i2c_address: ADDR_SA0_LOW,
            telemetry_every_samples: 10,
        }
    }
}

impl SystemConfig {
    /// Reject values the firmware cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sample_period_ms == 0 {
            return Err(Error::Config("sample_period_ms must be non-zero"));
        }
        if self.buffer_capacity_bytes < Sample::SIZE {
            return Err(Error::Config("buffer_capacity_bytes cannot hold one sample"));
        }
        if !matches!(self.sensor_i2c_address, ADDR_SA0_LOW | ADDR_SA0_HIGH) {
            return Err(Error::Config("sensor_i2c_address must be 0x18 or 0x19"));
        }
        Ok(())
    }

    /// Parse and validate.  Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }
}
