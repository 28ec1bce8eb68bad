//! Application core: pure domain logic, zero I/O.
//!
//! The sampling lifecycle lives here: the [`service`] drives the FSM and
//! reports through [`events`].  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
