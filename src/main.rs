//! Thermolog Firmware: Main Entry Point
//!
//! Duty-cycled temperature logger: wake on a periodic alarm, take one
//! LIS2DE12 reading, append it to the ring buffer, sleep again.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                    │
//! │                                                          │
//! │  HardwareAdapter                          LogEventSink   │
//! │  (Platform+Alarm+Sensor+Idle+Halt)        (EventSink)    │
//! │                                                          │
//! │  ───────────── Port Trait Boundary ─────────────         │
//! │                                                          │
//! │  ┌──────────────────────────────────────────────────┐    │
//! │  │          SamplerService (pure logic)             │    │
//! │  │  FSM · RingBuffer · AlarmBridge                  │    │
//! │  └──────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Host builds run the same core against a simulated LIS2DE12 bus, a
//! thread-backed alarm and a condvar idle.  Set `THERMOLOG_CONFIG` to a
//! JSON file to override [`SystemConfig`] defaults.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use thermolog::adapters::hardware::HardwareAdapter;
use thermolog::adapters::log_sink::LogEventSink;
use thermolog::app::service::SamplerService;
use thermolog::config::SystemConfig;
use thermolog::diagnostics::FatalRecord;
use thermolog::drivers::halt;
use thermolog::error::Error;
use thermolog::fsm::StateId;
use thermolog::ring_buffer::RingBuffer;
use thermolog::sensors::lis2de12::Lis2de12;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    init_logging()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Thermolog v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config();
    info!(
        "Config: period={}ms buffer={}B sensor=0x{:02X}",
        config.sample_period_ms, config.buffer_capacity_bytes, config.sensor_i2c_address
    );

    // ── 3. Hardware ───────────────────────────────────────────
    let hw = build_hardware(&config)?;

    // ── 4. Sample storage ─────────────────────────────────────
    let mut storage = vec![0u8; config.buffer_capacity_bytes];
    let buffer = match RingBuffer::new(&mut storage) {
        Ok(buffer) => buffer,
        Err(e) => halt::halt(&FatalRecord::new(StateId::Boot, 0, &Error::from(e))),
    };

    // ── 5. Sampling loop (never returns) ──────────────────────
    let mut sink = LogEventSink::new();
    let mut app = SamplerService::new(config, hw, buffer);
    app.run(&mut sink)
}

// ── Logging ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

/// stderr logger; `RUST_LOG` overrides the `info` default.
#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing console logger: {e}"))
}

// ── Configuration ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn load_config() -> SystemConfig {
    SystemConfig::default()
}

/// Environment variable naming a JSON config file.
#[cfg(not(target_os = "espidf"))]
const CONFIG_ENV: &str = "THERMOLOG_CONFIG";

#[cfg(not(target_os = "espidf"))]
fn load_config() -> SystemConfig {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        info!("{} not set, using defaults", CONFIG_ENV);
        return SystemConfig::default();
    };
    match read_config_file(&path) {
        Ok(cfg) => {
            info!("Config loaded from {}", path);
            cfg
        }
        Err(e) => {
            warn!("Config load failed ({:#}), using defaults", e);
            SystemConfig::default()
        }
    }
}

#[cfg(not(target_os = "espidf"))]
fn read_config_file(path: &str) -> Result<SystemConfig> {
    use anyhow::Context;
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let cfg = SystemConfig::from_json(&text).with_context(|| format!("parsing {path}"))?;
    Ok(cfg)
}

// ── Hardware ──────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn build_hardware(
    config: &SystemConfig,
) -> Result<HardwareAdapter<Lis2de12<esp_idf_hal::i2c::I2cDriver<'static>>>> {
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::units::FromValueType;

    let p = Peripherals::take()?;
    // I2C0: SDA = GPIO8, SCL = GPIO9, 100 kHz standard mode.
    let i2c = I2cDriver::new(
        p.i2c0,
        p.pins.gpio8,
        p.pins.gpio9,
        &I2cConfig::new().baudrate(100.kHz().into()),
    )?;
    Ok(HardwareAdapter::new(Lis2de12::new(
        i2c,
        config.sensor_i2c_address,
    )))
}

#[cfg(not(target_os = "espidf"))]
fn build_hardware(
    config: &SystemConfig,
) -> Result<HardwareAdapter<Lis2de12<thermolog::sensors::sim::SimLis2de12Bus>>> {
    use thermolog::sensors::sim::SimLis2de12Bus;

    warn!("Simulation mode: LIS2DE12 is a register model, alarm is a thread");
    let bus = SimLis2de12Bus::new(config.sensor_i2c_address);
    Ok(HardwareAdapter::new(Lis2de12::new(
        bus,
        config.sensor_i2c_address,
    )))
}
