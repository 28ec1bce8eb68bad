//! Thermolog firmware library.
//!
//! Exposes the sampling core (ring buffer, alarm bridge, state machine,
//! service) for integration testing and the binary.  All ESP-IDF-specific
//! code is guarded by `#[cfg(target_os = "espidf")]` within each module;
//! host builds get thread/condvar simulations in the same places.

#![deny(unused_must_use)]

pub mod app;
pub mod bridge;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fsm;
pub mod ring_buffer;

pub mod adapters;
pub mod drivers;
pub mod sensors;
