//! Platform drivers: power-management bring-up, wake-up alarm, idle wait
//! and halt.

pub mod halt;
pub mod hw_init;
pub mod hw_timer;
pub mod idle;
