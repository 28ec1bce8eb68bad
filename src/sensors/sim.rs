//! Host-side register model of the LIS2DE12 behind an I2C bus.
//!
//! Implements `embedded_hal::i2c::I2c` so the real driver runs unchanged in
//! simulation and tests.  Only what the driver touches is modelled: the
//! register file, the sub-address pointer with auto-increment, the identity
//! register and a temperature channel that refreshes on each burst read of
//! `OUT_TEMP_L` while enabled.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use super::lis2de12::{AUTO_INCREMENT, DEVICE_ID, TEMP_ENABLED, reg};

/// Slow triangle wave added to the base reading, one step per conversion.
const WAVEFORM: [i16; 8] = [0, 1, 2, 3, 4, 3, 2, 1];

pub struct SimLis2de12Bus {
    address: u8,
    regs: [u8; 0x40],
    pointer: u8,
    auto_increment: bool,
    base_temperature: i16,
    held: Option<i16>,
    phase: usize,
    failing_reads: u32,
    writes: Vec<(u8, u8)>,
}

impl SimLis2de12Bus {
    /// A powered-up part answering on `address`.
    pub fn new(address: u8) -> Self {
        let mut regs = [0u8; 0x40];
        regs[reg::WHO_AM_I as usize] = DEVICE_ID;
        Self {
            address,
            regs,
            pointer: 0,
            auto_increment: false,
            base_temperature: 25,
            held: None,
            phase: 0,
            failing_reads: 0,
            writes: Vec::new(),
        }
    }

    /// Centre of the simulated waveform.
    pub fn with_base_temperature(mut self, raw: i16) -> Self {
        self.base_temperature = raw;
        self
    }

    /// Pin the temperature output to `raw` instead of the waveform.
    pub fn hold_temperature(&mut self, raw: i16) {
        self.held = Some(raw);
    }

    /// Overwrite a register directly, bypassing the bus.
    pub fn set_register(&mut self, reg: u8, value: u8) {
        self.regs[usize::from(reg & 0x3F)] = value;
    }

    /// Make the next `n` read operations fail with a bus error.
    pub fn fail_next_reads(&mut self, n: u32) {
        self.failing_reads = n;
    }

    /// Every `(register, value)` written over the bus, in order.
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    fn temperature_enabled(&self) -> bool {
        self.regs[reg::TEMP_CFG_REG as usize] & TEMP_ENABLED == TEMP_ENABLED
    }

    fn convert_temperature(&mut self) {
        let raw = if self.temperature_enabled() {
            let wave = WAVEFORM[self.phase % WAVEFORM.len()];
            self.phase = self.phase.wrapping_add(1);
            self.held
                .unwrap_or_else(|| self.base_temperature.saturating_add(wave))
        } else {
            0
        };
        let [lo, hi] = raw.to_le_bytes();
        self.regs[reg::OUT_TEMP_L as usize] = lo;
        self.regs[reg::OUT_TEMP_H as usize] = hi;
    }

    fn advance(&mut self) {
        if self.auto_increment {
            self.pointer = (self.pointer + 1) & 0x3F;
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let Some((&sub, data)) = bytes.split_first() else {
            return;
        };
        self.pointer = sub & !AUTO_INCREMENT & 0x3F;
        self.auto_increment = sub & AUTO_INCREMENT != 0;
        for &value in data {
            self.regs[usize::from(self.pointer)] = value;
            self.writes.push((self.pointer, value));
            self.advance();
        }
    }

    fn read_bytes(&mut self, out: &mut [u8]) -> Result<(), ErrorKind> {
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(ErrorKind::Bus);
        }
        if self.pointer == reg::OUT_TEMP_L {
            self.convert_temperature();
        }
        for byte in out.iter_mut() {
            *byte = self.regs[usize::from(self.pointer)];
            self.advance();
        }
        Ok(())
    }
}

impl ErrorType for SimLis2de12Bus {
    type Error = ErrorKind;
}

impl I2c for SimLis2de12Bus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.write_bytes(bytes),
                Operation::Read(buf) => self.read_bytes(buf)?,
            }
        }
        Ok(())
    }
}
