//! End-to-end runs on the host simulation: real driver stack with a
//! thread-backed alarm, condvar idle and the LIS2DE12 register model.

use thermolog::adapters::hardware::HardwareAdapter;
use thermolog::app::service::SamplerService;
use thermolog::config::SystemConfig;
use thermolog::fsm::StateId;
use thermolog::ring_buffer::RingBuffer;
use thermolog::sensors::Sample;
use thermolog::sensors::lis2de12::{ADDR_SA0_LOW, Lis2de12};
use thermolog::sensors::sim::SimLis2de12Bus;

use crate::mock_hw::RecordingSink;

type SimBoard = HardwareAdapter<Lis2de12<SimLis2de12Bus>>;

fn sim_board(base: i16) -> SimBoard {
    let bus = SimLis2de12Bus::new(ADDR_SA0_LOW).with_base_temperature(base);
    HardwareAdapter::new(Lis2de12::new(bus, ADDR_SA0_LOW))
}

fn fast_config() -> SystemConfig {
    SystemConfig {
        sample_period_ms: 5,
        ..SystemConfig::default()
    }
}

#[test]
fn simulated_alarm_drives_sampling() {
    let mut mem = [0u8; 64];
    let mut sink = RecordingSink::new();
    let mut app =
        SamplerService::new(fast_config(), sim_board(40), RingBuffer::new(&mut mem).unwrap());
    app.start(&mut sink);

    // Each Idle tick blocks until the next 5 ms alarm.
    let mut ticks = 0;
    while app.metrics().samples_stored < 5 {
        app.tick(&mut sink);
        ticks += 1;
        assert!(ticks < 1_000, "sampling stalled in {:?}", app.state());
    }

    let stored = sink.stored();
    assert!(stored.len() >= 5);
    assert!(
        stored.iter().all(|s| (40..=44).contains(&s.raw())),
        "readings outside simulated waveform: {stored:?}"
    );
    assert_eq!(app.metrics().sensor_read_failures, 0);
    assert_eq!(app.buffer().len(), stored.len() * Sample::SIZE);
}

#[test]
fn simulated_sensor_fault_is_counted() {
    let mut mem = [0u8; 64];
    let mut sink = RecordingSink::new();
    let mut app =
        SamplerService::new(fast_config(), sim_board(25), RingBuffer::new(&mut mem).unwrap());
    app.start(&mut sink);
    while app.state() != StateId::Idle {
        app.tick(&mut sink);
    }

    app.hardware_mut().sensor_mut().bus_mut().fail_next_reads(1);
    let mut ticks = 0;
    while app.metrics().samples_stored < 2 {
        app.tick(&mut sink);
        ticks += 1;
        assert!(ticks < 1_000, "sampling stalled in {:?}", app.state());
    }

    assert_eq!(app.metrics().sensor_read_failures, 1);
}

#[test]
fn foreign_interrupt_is_a_spurious_wakeup() {
    let mut mem = [0u8; 64];
    let mut sink = RecordingSink::new();
    let config = SystemConfig {
        sample_period_ms: 60_000,
        ..SystemConfig::default()
    };
    let mut app = SamplerService::new(config, sim_board(25), RingBuffer::new(&mut mem).unwrap());
    app.start(&mut sink);
    for _ in 0..3 {
        app.tick(&mut sink);
    }
    assert_eq!(app.state(), StateId::Idle);

    // Some other interrupt source; the alarm is a minute away.
    app.hardware().wake_handle().wake();
    app.tick(&mut sink);

    assert_eq!(app.state(), StateId::Idle);
    assert_eq!(app.metrics().wakeups, 1);
    assert_eq!(app.metrics().spurious_wakeups, 1);
    assert_eq!(app.metrics().samples_stored, 1);
}
