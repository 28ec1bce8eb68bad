//! Integration tests for the SamplerService → FSM → ports pipeline.
//!
//! Drives the full lifecycle (bring-up, alarm-driven sampling, buffer
//! back-pressure, fatal halts) against scripted mock hardware.

use std::sync::Arc;

use embedded_hal::i2c::ErrorKind;
use thermolog::app::events::SamplerEvent;
use thermolog::app::service::SamplerService;
use thermolog::config::SystemConfig;
use thermolog::drivers::hw_init::HwInitError;
use thermolog::error::{BufferError, SensorError, TimerError};
use thermolog::fsm::StateId;
use thermolog::ring_buffer::RingBuffer;
use thermolog::sensors::Sample;

use crate::mock_hw::{HwCall, MockHardware, RecordingSink};

type App<'buf> = SamplerService<'buf, MockHardware>;

fn make_app<'buf>(mem: &'buf mut [u8], hw: MockHardware) -> App<'buf> {
    SamplerService::new(SystemConfig::default(), hw, RingBuffer::new(mem).unwrap())
}

/// Start and tick through Boot → SensorInit → Sample → Idle.
fn bring_up(app: &mut App<'_>, sink: &mut RecordingSink) {
    app.start(sink);
    for _ in 0..3 {
        app.tick(sink);
    }
    assert_eq!(app.state(), StateId::Idle);
}

/// One full alarm cycle: Idle → Sample → Idle.
fn alarm_cycle(app: &mut App<'_>, sink: &mut RecordingSink) {
    app.hardware().fire_alarm();
    app.tick(sink);
    assert_eq!(app.state(), StateId::Sample);
    app.tick(sink);
    assert_eq!(app.state(), StateId::Idle);
}

fn drain_samples(app: &mut App<'_>) -> Vec<Sample> {
    let mut out = Vec::new();
    let mut bytes = [0u8; Sample::SIZE];
    while app.buffer_mut().read(&mut bytes).is_ok() {
        out.push(Sample::from_le_bytes(bytes));
    }
    out
}

// ── Bring-up ──────────────────────────────────────────────────

#[test]
fn bring_up_calls_ports_in_order() {
    let mut mem = [0u8; 16];
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut mem, MockHardware::new());
    bring_up(&mut app, &mut sink);

    assert_eq!(
        app.hardware().calls,
        [
            HwCall::InitPlatform,
            HwCall::InitTimer,
            HwCall::SetPeriodicAlarm(1000),
            HwCall::InitSensor,
            HwCall::EnableTemperature,
            HwCall::ReadTemperature,
        ]
    );
}

#[test]
fn bring_up_emits_expected_events() {
    let mut mem = [0u8; 16];
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut mem, MockHardware::new());
    bring_up(&mut app, &mut sink);

    assert_eq!(
        sink.events,
        [
            SamplerEvent::Started(StateId::Boot),
            SamplerEvent::StateChanged {
                from: StateId::Boot,
                to: StateId::SensorInit
            },
            SamplerEvent::StateChanged {
                from: StateId::SensorInit,
                to: StateId::Sample
            },
            SamplerEvent::SampleStored {
                sample: MockHardware::DEFAULT_READING,
                buffered_bytes: 2
            },
            SamplerEvent::StateChanged {
                from: StateId::Sample,
                to: StateId::Idle
            },
        ]
    );
}

#[test]
fn boot_and_sensor_init_run_exactly_once() {
    let mut mem = [0u8; 64];
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut mem, MockHardware::new());
    bring_up(&mut app, &mut sink);
    for _ in 0..10 {
        alarm_cycle(&mut app, &mut sink);
    }

    let hw = app.hardware();
    assert_eq!(hw.count(HwCall::InitPlatform), 1);
    assert_eq!(hw.count(HwCall::InitTimer), 1);
    assert_eq!(hw.count(HwCall::InitSensor), 1);
    assert_eq!(hw.count(HwCall::EnableTemperature), 1);
    assert_eq!(hw.count(HwCall::ReadTemperature), 11);
    assert!(
        !sink.events.iter().any(|e| matches!(
            e,
            SamplerEvent::StateChanged {
                to: StateId::Boot | StateId::SensorInit,
                from: StateId::Sample | StateId::Idle
            }
        ))
    );
}

#[test]
fn configured_period_reaches_the_alarm() {
    let mut mem = [0u8; 8];
    let mut sink = RecordingSink::new();
    let config = SystemConfig {
        sample_period_ms: 250,
        ..SystemConfig::default()
    };
    let mut app =
        SamplerService::new(config, MockHardware::new(), RingBuffer::new(&mut mem).unwrap());
    app.start(&mut sink);
    assert_eq!(app.hardware().count(HwCall::SetPeriodicAlarm(250)), 1);
}

// ── Alarm-driven sampling ─────────────────────────────────────

#[test]
fn idle_without_alarm_never_samples() {
    let mut mem = [0u8; 16];
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut mem, MockHardware::new());
    bring_up(&mut app, &mut sink);

    for _ in 0..20 {
        app.tick(&mut sink);
        assert_eq!(app.state(), StateId::Idle);
    }
    assert_eq!(app.metrics().samples_stored, 1);
    assert_eq!(app.metrics().wakeups, 20);
    assert_eq!(app.metrics().spurious_wakeups, 20);
    assert_eq!(app.ticks_in_current_state(), 20);
}

#[test]
fn each_alarm_produces_one_sample() {
    let mut mem = [0u8; 32];
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut mem, MockHardware::new());
    bring_up(&mut app, &mut sink);

    for _ in 0..5 {
        alarm_cycle(&mut app, &mut sink);
        // A quiet wake in between changes nothing.
        app.tick(&mut sink);
        assert_eq!(app.state(), StateId::Idle);
    }

    assert_eq!(app.metrics().samples_stored, 6);
    assert_eq!(app.buffer().len(), 6 * Sample::SIZE);
    assert_eq!(app.metrics().spurious_wakeups, 5);
}

#[test]
fn alarm_while_sleeping_wakes_into_sample() {
    let mut mem = [0u8; 32];
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new();
    hw.alarms_during_wait = 3;
    let mut app = make_app(&mut mem, hw);
    bring_up(&mut app, &mut sink);

    for _ in 0..10 {
        app.tick(&mut sink);
    }

    assert_eq!(app.metrics().samples_stored, 4);
    assert_eq!(app.metrics().wakeups, 3 + 4);
    assert_eq!(app.metrics().spurious_wakeups, 4);
}

#[test]
fn burst_of_alarms_coalesces_into_one_sample() {
    let mut mem = [0u8; 32];
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut mem, MockHardware::new());
    bring_up(&mut app, &mut sink);

    for _ in 0..5 {
        app.hardware().fire_alarm();
    }
    for _ in 0..20 {
        app.tick(&mut sink);
    }

    let idle_to_sample = sink
        .events
        .iter()
        .filter(|e| {
            **e == SamplerEvent::StateChanged {
                from: StateId::Idle,
                to: StateId::Sample,
            }
        })
        .count();
    assert_eq!(idle_to_sample, 1);
    assert_eq!(app.metrics().samples_stored, 2);
}

#[test]
fn alarms_during_bring_up_are_not_lost_or_multiplied() {
    let mut mem = [0u8; 32];
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut mem, MockHardware::new());

    app.start(&mut sink);
    app.hardware().fire_alarm(); // during Boot
    app.tick(&mut sink);
    app.hardware().fire_alarm(); // during SensorInit
    app.tick(&mut sink);
    app.tick(&mut sink);
    assert_eq!(app.state(), StateId::Idle);

    for _ in 0..10 {
        app.tick(&mut sink);
    }
    assert_eq!(app.metrics().samples_stored, 2);
}

#[test]
fn samples_drain_in_fifo_order() {
    let mut mem = [0u8; 32];
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new();
    hw.readings = [Sample(10), Sample(-20), Sample(300), Sample(i16::MIN)]
        .into_iter()
        .map(Ok)
        .collect();
    let mut app = make_app(&mut mem, hw);
    bring_up(&mut app, &mut sink);
    for _ in 0..3 {
        alarm_cycle(&mut app, &mut sink);
    }

    let expected = [Sample(10), Sample(-20), Sample(300), Sample(i16::MIN)];
    assert_eq!(sink.stored(), expected);
    assert_eq!(drain_samples(&mut app), expected);
    assert!(app.buffer().is_empty());
}

#[test]
fn draining_across_the_wrap_keeps_order() {
    // Odd capacity so the third sample straddles the end of storage.
    let mut mem = [0u8; 5];
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new();
    hw.readings = (1..=4).map(|v| Ok(Sample(v * 0x0101))).collect();
    let mut app = make_app(&mut mem, hw);
    bring_up(&mut app, &mut sink);
    alarm_cycle(&mut app, &mut sink);

    let mut one = [0u8; Sample::SIZE];
    app.buffer_mut().read(&mut one).unwrap();
    assert_eq!(Sample::from_le_bytes(one), Sample(0x0101));

    alarm_cycle(&mut app, &mut sink);
    assert_eq!(drain_samples(&mut app), [Sample(0x0202), Sample(0x0303)]);
}

// ── Buffer back-pressure ──────────────────────────────────────

#[test]
fn full_buffer_drops_sample_and_returns_to_idle() {
    let mut mem = [0u8; 4];
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut mem, MockHardware::new());
    bring_up(&mut app, &mut sink);
    alarm_cycle(&mut app, &mut sink);
    assert!(app.buffer().is_full());

    alarm_cycle(&mut app, &mut sink);

    assert_eq!(app.metrics().samples_stored, 2);
    assert_eq!(app.metrics().capacity_exceeded, 1);
    assert_eq!(app.buffer().len(), 4);
    assert!(sink.events.contains(&SamplerEvent::SampleDropped {
        sample: MockHardware::DEFAULT_READING,
        free_bytes: 0
    }));
}

#[test]
fn partial_room_is_not_used() {
    let mut mem = [0u8; 3];
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut mem, MockHardware::new());
    bring_up(&mut app, &mut sink);
    alarm_cycle(&mut app, &mut sink);

    assert_eq!(app.buffer().len(), 2);
    assert_eq!(app.metrics().capacity_exceeded, 1);
    let mut tail = [0u8; 3];
    assert_eq!(
        app.buffer_mut().read(&mut tail),
        Err(BufferError::Underflow {
            requested: 3,
            available: 2
        })
    );
}

#[test]
fn draining_makes_room_again() {
    let mut mem = [0u8; 2];
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut mem, MockHardware::new());
    bring_up(&mut app, &mut sink);
    alarm_cycle(&mut app, &mut sink);
    assert_eq!(app.metrics().capacity_exceeded, 1);

    assert_eq!(drain_samples(&mut app).len(), 1);
    alarm_cycle(&mut app, &mut sink);
    assert_eq!(app.metrics().samples_stored, 2);
    assert_eq!(app.metrics().capacity_exceeded, 1);
}

// ── Sensor read failures ──────────────────────────────────────

#[test]
fn failed_read_stores_nothing_and_continues() {
    let mut mem = [0u8; 16];
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new();
    let err = SensorError::Bus(ErrorKind::ArbitrationLoss);
    hw.readings.push_back(Ok(Sample(5)));
    hw.readings.push_back(Err(err));
    hw.readings.push_back(Ok(Sample(6)));
    let mut app = make_app(&mut mem, hw);
    bring_up(&mut app, &mut sink);
    alarm_cycle(&mut app, &mut sink);
    alarm_cycle(&mut app, &mut sink);

    assert_eq!(app.metrics().sensor_read_failures, 1);
    assert_eq!(app.metrics().samples_stored, 2);
    assert!(sink.events.contains(&SamplerEvent::SensorReadFailed(err)));
    assert_eq!(drain_samples(&mut app), [Sample(5), Sample(6)]);
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_carries_metrics_snapshot() {
    let mut mem = [0u8; 64];
    let mut sink = RecordingSink::new();
    let config = SystemConfig {
        telemetry_every_samples: 3,
        ..SystemConfig::default()
    };
    let mut app =
        SamplerService::new(config, MockHardware::new(), RingBuffer::new(&mut mem).unwrap());
    bring_up(&mut app, &mut sink);
    for _ in 0..5 {
        alarm_cycle(&mut app, &mut sink);
    }

    let telemetry: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            SamplerEvent::Telemetry(t) => Some(t),
            _ => None,
        })
        .collect();
    assert_eq!(telemetry.len(), 2);
    assert_eq!(telemetry[0].metrics.samples_stored, 3);
    assert_eq!(telemetry[1].metrics.samples_stored, 6);
    assert_eq!(telemetry[1].capacity_bytes, 64);
    assert_eq!(telemetry[1].last_sample, Some(MockHardware::DEFAULT_READING));
}

#[test]
fn telemetry_disabled_with_zero() {
    let mut mem = [0u8; 16];
    let mut sink = RecordingSink::new();
    let config = SystemConfig {
        telemetry_every_samples: 0,
        ..SystemConfig::default()
    };
    let mut app =
        SamplerService::new(config, MockHardware::new(), RingBuffer::new(&mut mem).unwrap());
    bring_up(&mut app, &mut sink);
    alarm_cycle(&mut app, &mut sink);

    assert!(
        !sink
            .events
            .iter()
            .any(|e| matches!(e, SamplerEvent::Telemetry(_)))
    );
}

#[test]
fn build_telemetry_reports_last_sample() {
    let mut mem = [0u8; 8];
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new();
    hw.readings.push_back(Ok(Sample(-7)));
    let mut app = make_app(&mut mem, hw);

    assert_eq!(app.build_telemetry().last_sample, None);
    bring_up(&mut app, &mut sink);

    let t = app.build_telemetry();
    assert_eq!(t.last_sample, Some(Sample(-7)));
    assert_eq!(t.capacity_bytes, 8);
    assert_eq!(t.buffered_bytes, Sample::SIZE);
    assert_eq!(t.state, StateId::Idle);
}

#[test]
fn bridge_handle_is_the_one_given_to_the_alarm() {
    let mut mem = [0u8; 8];
    let mut app = make_app(&mut mem, MockHardware::new());
    app.start(&mut RecordingSink::new());

    let armed = app.hardware().bridge.clone().unwrap();
    assert!(Arc::ptr_eq(&armed, &app.bridge()));
}

// ── Fatal bring-up failures ───────────────────────────────────

#[test]
#[should_panic(expected = "halted in Boot")]
fn platform_failure_halts() {
    let mut mem = [0u8; 8];
    let mut hw = MockHardware::new();
    hw.fail_platform = Some(HwInitError::PowerConfigFailed(-1));
    let mut app = make_app(&mut mem, hw);
    app.start(&mut RecordingSink::new());
}

#[test]
#[should_panic(expected = "halted in Boot: timer: timer init failed")]
fn timer_init_failure_halts() {
    let mut mem = [0u8; 8];
    let mut hw = MockHardware::new();
    hw.fail_timer_init = Some(TimerError::InitFailed(259));
    let mut app = make_app(&mut mem, hw);
    app.start(&mut RecordingSink::new());
}

#[test]
#[should_panic(expected = "halted in Boot: timer: periodic alarm start failed")]
fn alarm_arm_failure_halts() {
    let mut mem = [0u8; 8];
    let mut hw = MockHardware::new();
    hw.fail_alarm_arm = Some(TimerError::ArmFailed(258));
    let mut app = make_app(&mut mem, hw);
    app.start(&mut RecordingSink::new());
}

#[test]
#[should_panic(expected = "halted in SensorInit: sensor: unexpected device id 0x00")]
fn wrong_sensor_identity_halts() {
    let mut mem = [0u8; 8];
    let mut hw = MockHardware::new();
    hw.fail_sensor_init = Some(SensorError::UnexpectedDevice(0x00));
    let mut app = make_app(&mut mem, hw);
    let mut sink = RecordingSink::new();
    app.start(&mut sink);
    app.tick(&mut sink);
}

#[test]
#[should_panic(expected = "halted in SensorInit")]
fn enable_temperature_failure_halts() {
    let mut mem = [0u8; 8];
    let mut hw = MockHardware::new();
    hw.fail_enable = Some(SensorError::Bus(ErrorKind::NoAcknowledge(
        embedded_hal::i2c::NoAcknowledgeSource::Data,
    )));
    let mut app = make_app(&mut mem, hw);
    let mut sink = RecordingSink::new();
    app.start(&mut sink);
    app.tick(&mut sink);
}

#[test]
fn undersized_storage_is_rejected_before_start() {
    let mut mem = [0u8; 1];
    assert_eq!(
        RingBuffer::new(&mut mem).unwrap_err(),
        BufferError::TooSmall { capacity: 1 }
    );
}
