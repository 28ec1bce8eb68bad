//! ST LIS2DE12 accelerometer, used here for its embedded temperature sensor.
//!
//! Generic over any `embedded_hal::i2c::I2c` bus.  The part answers on
//! 0x18 (SA0 low) or 0x19 (SA0 high).  Register sub-addresses carry an
//! auto-increment flag in bit 7 for burst transfers.
//!
//! Bring-up sequence:
//!
//! 1. [`init_sensor`](SensorPort::init_sensor) checks `WHO_AM_I == 0x33`.
//! 2. [`enable_temperature_reporting`](SensorPort::enable_temperature_reporting)
//!    sets `TEMP_EN[1:0]`, block data update and a 1 Hz output data rate.
//!    The temperature output only refreshes while the ODR is non-zero.
//! 3. [`read_temperature`](SensorPort::read_temperature) bursts
//!    `OUT_TEMP_L/H` and assembles them little-endian.
//!
//! The reading is passed on raw.  The datasheet gives no absolute scale for
//! the temperature channel, only relative change.

use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, info};

use super::Sample;
use crate::app::ports::SensorPort;
use crate::error::SensorError;

// ---------------------------------------------------------------------------
// Device constants
// ---------------------------------------------------------------------------

/// I2C address with SA0 tied low.
pub const ADDR_SA0_LOW: u8 = 0x18;
/// I2C address with SA0 tied high.
pub const ADDR_SA0_HIGH: u8 = 0x19;

/// Identity reported by `WHO_AM_I`.
pub const DEVICE_ID: u8 = 0x33;

/// Sub-address flag requesting auto-increment.
pub const AUTO_INCREMENT: u8 = 0x80;

pub mod reg {
    pub const OUT_TEMP_L: u8 = 0x0C;
    pub const OUT_TEMP_H: u8 = 0x0D;
    pub const WHO_AM_I: u8 = 0x0F;
    pub const TEMP_CFG_REG: u8 = 0x1F;
    pub const CTRL_REG1: u8 = 0x20;
    pub const CTRL_REG4: u8 = 0x23;
}

/// `TEMP_CFG_REG`: both TEMP_EN bits set.
pub const TEMP_ENABLED: u8 = 0b11 << 6;
/// `CTRL_REG1`: ODR = 1 Hz, low-power mode, X/Y/Z enabled.
pub const CTRL_REG1_1HZ: u8 = 0x1F;
/// `CTRL_REG4`: block data update, so L/H bytes come from the same conversion.
pub const CTRL_REG4_BDU: u8 = 0x80;

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub struct Lis2de12<I2C> {
    i2c: I2C,
    address: u8,
    temp_enabled: bool,
}

impl<I2C: I2c> Lis2de12<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            temp_enabled: false,
        }
    }

    pub fn bus_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    pub fn read_reg(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut value)
            .map_err(|e| SensorError::Bus(e.kind()))?;
        Ok(value[0])
    }

    pub fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        debug!("LIS2DE12: 0x{reg:02X} <- 0x{value:02X}");
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|e| SensorError::Bus(e.kind()))
    }

    /// Burst read starting at `reg`.
    fn read_regs(&mut self, reg: u8, out: &mut [u8]) -> Result<(), SensorError> {
        self.i2c
            .write_read(self.address, &[reg | AUTO_INCREMENT], out)
            .map_err(|e| SensorError::Bus(e.kind()))
    }
}

impl<I2C: I2c> SensorPort for Lis2de12<I2C> {
    fn init_sensor(&mut self) -> Result<(), SensorError> {
        let id = self.read_reg(reg::WHO_AM_I)?;
        if id != DEVICE_ID {
            return Err(SensorError::UnexpectedDevice(id));
        }
        info!("LIS2DE12 found at 0x{:02X}", self.address);
        Ok(())
    }

    fn enable_temperature_reporting(&mut self) -> Result<(), SensorError> {
        self.write_reg(reg::TEMP_CFG_REG, TEMP_ENABLED)?;
        self.write_reg(reg::CTRL_REG4, CTRL_REG4_BDU)?;
        self.write_reg(reg::CTRL_REG1, CTRL_REG1_1HZ)?;
        self.temp_enabled = true;
        Ok(())
    }

    fn read_temperature(&mut self) -> Result<Sample, SensorError> {
        if !self.temp_enabled {
            return Err(SensorError::NotEnabled);
        }
        let mut raw = [0u8; Sample::SIZE];
        self.read_regs(reg::OUT_TEMP_L, &mut raw)?;
        Ok(Sample::from_le_bytes(raw))
    }
}
