//! Integration tests for the mode scheduler
//!
//! Drives a [`Node`] through boot, telemetry cycles, setting-mode entry and
//! timeout, and LoRaWAN events, using the doubles from `common`.

#![cfg(test)]

mod common;

use heapless::spsc::Queue;
use heapless::Vec as HVec;

use pmnode_core::constants::console::{MSG_SETTING_TIMEOUT, PROMPT};
use pmnode_core::downlink::DeviceClass;
use pmnode_core::payload::PayloadMode;
use pmnode_core::traits::{MacEvent, TimerId};
use pmnode_core::{NodeConfig, NodeError, NodeState, OperatingMode, Signal, Signals};

use common::{
    build_node, clear_output, output, type_text, EchoSensor, RecordingMac, SentFrame, QUEUE_LEN,
};

const LOCATION_PAYLOAD: [u8; 7] = [0x11, 0x14, 0xF5, 0xD6, 0x99, 0x65, 0x0D];

#[test]
fn test_boot_sequence() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::default(),
    );

    node.start().unwrap();

    // stop, auto-send disable, read coefficient
    assert_eq!(node.sensor().port().opcodes(), vec![0x02, 0x20, 0x10]);
    assert_eq!(node.mac().join_calls, 1);
    assert_eq!(node.board().tx_timer, Some(60_000));
    assert!(node.tx_armed());
    assert!(signals.is_pending(Signal::TxTimer));
    assert_eq!(node.state(), NodeState::Idle);
}

#[test]
fn test_boot_survives_dead_sensor() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::disconnected(),
        RecordingMac::default(),
    );

    assert!(node.start().is_ok());
    assert_eq!(node.mac().join_calls, 1);
    assert!(node.tx_armed());
}

#[test]
fn test_transmit_on_arm_can_be_disabled() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default().with_transmit_on_arm(false),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );

    node.start().unwrap();
    assert!(node.tx_armed());
    assert!(!signals.any_pending());
}

#[test]
fn test_not_joined_skips_sensor() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::default(),
    );
    node.start().unwrap();
    let frames_after_boot = node.sensor().port().frames.len();

    // Retried quietly, not reported as a loop failure
    assert_eq!(node.poll(), Ok(()));

    assert_eq!(node.mac().join_calls, 2);
    assert!(node.mac().sent.is_empty());
    assert_eq!(node.sensor().port().frames.len(), frames_after_boot);
    assert_eq!(node.delay().total_ms(), 0);
    assert_eq!(node.state(), NodeState::Idle);
    assert_eq!(node.board().sleeps, 1);
}

#[test]
fn test_measurement_cycle_sends_reading() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::new().with_reading(42, 55),
        RecordingMac::joined(),
    );
    node.start().unwrap();

    node.poll().unwrap();

    assert_eq!(
        node.mac().sent,
        vec![SentFrame { payload: vec![0x11, 42], port: 2, confirmed: false }]
    );
    // boot frames, then start, read, stop
    assert_eq!(node.sensor().port().opcodes()[3..], [0x01, 0x04, 0x02]);
    assert!(!node.sensor().port().running);
    assert_eq!(node.delay().total_ms(), 10_000);
    assert_eq!(node.sensor().last_reading().pm2_5, 42);
    assert_eq!(node.state(), NodeState::Idle);
}

#[test]
fn test_payload_alternates_with_location() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::new().with_reading(20, 30),
        RecordingMac::joined(),
    );
    node.start().unwrap();

    node.poll().unwrap();
    signals.raise(Signal::TxTimer);
    node.poll().unwrap();
    signals.raise(Signal::TxTimer);
    node.poll().unwrap();

    let payloads: Vec<Vec<u8>> = node.mac().sent.iter().map(|f| f.payload.clone()).collect();
    assert_eq!(payloads, vec![vec![0x11, 20], LOCATION_PAYLOAD.to_vec(), vec![0x11, 20]]);
}

#[test]
fn test_particulate_only_mode() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default().with_payload_mode(PayloadMode::ParticulateOnly),
        &signals,
        consumer,
        EchoSensor::new().with_reading(20, 30),
        RecordingMac::joined(),
    );
    node.start().unwrap();

    for _ in 0..3 {
        signals.raise(Signal::TxTimer);
        node.poll().unwrap();
    }

    assert!(node.mac().sent.iter().all(|f| f.payload == vec![0x11, 20]));
}

#[test]
fn test_low_battery_sends_fault() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );
    node.board_mut().battery = 4;
    node.start().unwrap();

    node.poll().unwrap();

    assert_eq!(node.mac().sent[0].payload, vec![17, 191]);
}

#[test]
fn test_sensor_failure_sends_fault() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut sensor = EchoSensor::new();
    sensor.garble_reads = true;
    let mut node = build_node(NodeConfig::default(), &signals, consumer, sensor, RecordingMac::joined());
    node.start().unwrap();

    node.poll().unwrap();

    assert_eq!(node.mac().sent[0].payload, vec![0x11, 0xBF]);
    // The sensor is still stopped after the failed read
    assert_eq!(*node.sensor().port().opcodes().last().unwrap(), 0x02);
}

#[test]
fn test_sentinel_reading_is_remapped() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::new().with_reading(191, 200),
        RecordingMac::joined(),
    );
    node.start().unwrap();

    node.poll().unwrap();

    assert_eq!(node.mac().sent[0].payload, vec![0x11, 190]);
}

#[test]
fn test_button_enters_setting_mode() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );
    node.start().unwrap();
    node.poll().unwrap();
    assert_eq!(node.mac().sent.len(), 1);

    signals.raise(Signal::Button);
    node.poll().unwrap();

    assert_eq!(node.state(), NodeState::AwaitingInput { idle_ticks: 0 });
    assert!(!node.tx_armed());
    assert_eq!(node.board().tx_timer, None);
    assert_eq!(node.board().setting_timer, Some(5_000));
    assert!(output(&node).ends_with(PROMPT));

    // Stale uplink requests are dropped while in setting mode
    signals.raise(Signal::TxTimer);
    node.poll().unwrap();
    assert_eq!(node.mac().sent.len(), 1);
}

#[test]
fn test_button_pending_input_discarded_on_entry() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (mut producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default().with_transmit_on_arm(false),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );
    node.start().unwrap();

    type_text(&mut producer, b"garbage");
    signals.raise(Signal::Button);
    node.poll().unwrap();

    assert_eq!(output(&node), PROMPT);
    assert!(node.line().is_empty());
}

#[test]
fn test_setting_timeout_after_25_ticks() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default().with_transmit_on_arm(false),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );
    node.start().unwrap();
    node.enter_setting_mode().unwrap();
    clear_output(&mut node);
    let tx_starts = node.board().starts_of(TimerId::Transmit);

    for tick in 1..25u8 {
        signals.raise(Signal::SettingTick);
        node.poll().unwrap();
        assert_eq!(node.state(), NodeState::AwaitingInput { idle_ticks: tick });
    }
    assert_eq!(node.board().starts_of(TimerId::Transmit), tx_starts);

    signals.raise(Signal::SettingTick);
    node.poll().unwrap();

    assert_eq!(node.mode(), OperatingMode::Normal);
    assert_eq!(output(&node), MSG_SETTING_TIMEOUT);
    assert_eq!(node.board().starts_of(TimerId::Transmit), tx_starts + 1);
    assert_eq!(node.board().tx_timer, Some(60_000));
    assert_eq!(node.board().setting_timer, None);
    assert!(node.tx_armed());

    // Late ticks do nothing in normal mode
    signals.raise(Signal::SettingTick);
    node.poll().unwrap();
    assert_eq!(node.board().starts_of(TimerId::Transmit), tx_starts + 1);
    assert_eq!(output(&node).matches("TIMEOUT").count(), 1);
}

#[test]
fn test_received_byte_resets_inactivity() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (mut producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );
    node.enter_setting_mode().unwrap();

    for _ in 0..20 {
        signals.raise(Signal::SettingTick);
        node.poll().unwrap();
    }
    type_text(&mut producer, b"c");
    node.poll().unwrap();
    assert_eq!(node.state(), NodeState::AwaitingInput { idle_ticks: 0 });

    for _ in 0..24 {
        signals.raise(Signal::SettingTick);
        node.poll().unwrap();
    }
    assert_eq!(node.mode(), OperatingMode::Setting);
}

#[test]
fn test_queued_byte_beats_final_tick() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (mut producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default().with_transmit_on_arm(false),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );
    node.enter_setting_mode().unwrap();
    clear_output(&mut node);

    for _ in 0..24 {
        signals.raise(Signal::SettingTick);
        node.poll().unwrap();
    }
    type_text(&mut producer, b"c");
    signals.raise(Signal::SettingTick);
    node.poll().unwrap();

    assert_eq!(node.mode(), OperatingMode::Setting);
    assert_eq!(node.state(), NodeState::AwaitingInput { idle_ticks: 0 });
    assert_eq!(node.line().as_slice(), b"c");
    assert_eq!(output(&node), "c");
    assert_eq!(node.board().setting_timer, Some(5_000));
}

#[test]
fn test_tx_timer_in_setting_mode_keeps_session() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );
    node.enter_setting_mode().unwrap();

    signals.raise(Signal::TxTimer);
    node.poll().unwrap();

    assert_eq!(node.mode(), OperatingMode::Setting);
    assert!(node.mac().sent.is_empty());
    assert!(node.sensor().port().frames.is_empty());
    assert_eq!(node.board().setting_timer, Some(5_000));
    assert_eq!(node.board().tx_timer, None);
    assert!(!node.tx_armed());
}

#[test]
fn test_start_in_setting_mode() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default().with_start_in_setting_mode(true),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::default(),
    );

    node.start().unwrap();

    assert_eq!(node.mode(), OperatingMode::Setting);
    assert_eq!(output(&node), PROMPT);
    assert_eq!(node.mac().join_calls, 1);
    assert!(!node.tx_armed());
    assert_eq!(node.board().tx_timer, None);
}

#[test]
fn test_polled_button() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default().with_poll_button(true),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );
    node.start().unwrap();

    node.board_mut().button = true;
    node.poll().unwrap();

    assert_eq!(node.mode(), OperatingMode::Setting);
    assert!(node.mac().sent.is_empty());
}

#[test]
fn test_button_level_ignored_without_polling() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );
    node.start().unwrap();

    node.board_mut().button = true;
    node.poll().unwrap();

    assert_eq!(node.mode(), OperatingMode::Normal);
    assert_eq!(node.mac().sent.len(), 1);
}

#[test]
fn test_mac_events() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default().with_default_class(DeviceClass::C),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );

    node.mac_mut().events.push_back(MacEvent::Joined);
    node.poll().unwrap();
    assert_eq!(node.mac().class_requests, vec![DeviceClass::C]);

    node.mac_mut().events.push_back(MacEvent::ClassConfirmed(DeviceClass::C));
    node.mac_mut().events.push_back(MacEvent::TxNeeded);
    node.poll().unwrap();
    let empty = SentFrame { payload: vec![], port: 2, confirmed: false };
    assert_eq!(node.mac().sent, vec![empty.clone(), empty]);
}

#[test]
fn test_downlinks() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );

    let downlink = |port: u8, bytes: &[u8]| MacEvent::Downlink {
        port,
        data: HVec::from_slice(bytes).unwrap(),
    };

    node.mac_mut().events.push_back(downlink(3, &[1]));
    node.poll().unwrap();
    assert_eq!(node.mac().class_requests, vec![DeviceClass::B]);

    node.mac_mut().events.push_back(downlink(2, &[0x01]));
    node.poll().unwrap();
    assert!(node.board().led);
    assert!(node.led_on());

    node.mac_mut().events.push_back(downlink(99, &[0x00, 0x01, 0x00]));
    node.poll().unwrap();
    assert!(!node.board().led);

    node.mac_mut().events.push_back(downlink(99, &[0x00, 0x01, 100]));
    node.poll().unwrap();
    assert!(node.board().led);

    // Wrong length on the class port is ignored
    node.mac_mut().events.push_back(downlink(3, &[1, 2]));
    node.poll().unwrap();
    assert_eq!(node.mac().class_requests.len(), 1);
}

#[test]
fn test_mac_serviced_in_setting_mode() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default(),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );
    node.enter_setting_mode().unwrap();

    signals.raise(Signal::MacProcess);
    node.poll().unwrap();

    assert_eq!(node.mac().process_calls, 1);
    assert_eq!(node.mode(), OperatingMode::Setting);
}

#[test]
fn test_sleeps_only_when_idle() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let mut node = build_node(
        NodeConfig::default().with_transmit_on_arm(false),
        &signals,
        consumer,
        EchoSensor::new(),
        RecordingMac::joined(),
    );
    node.start().unwrap();

    node.poll().unwrap();
    assert_eq!(node.board().sleeps, 1);

    // Everything pending is handled before the node sleeps again
    node.mac_mut().events.push_back(MacEvent::TxNeeded);
    signals.raise(Signal::TxTimer);
    signals.raise(Signal::MacProcess);
    node.poll().unwrap();
    assert_eq!(node.board().sleeps, 2);
    assert_eq!(node.mac().sent.len(), 2);
}

#[test]
fn test_invalid_config_rejected() {
    let signals = Signals::new();
    let mut queue: Queue<u8, QUEUE_LEN> = Queue::new();
    let (_producer, consumer) = queue.split();
    let parts = pmnode_core::NodeParts {
        sensor_port: EchoSensor::new(),
        mac: RecordingMac::default(),
        board: common::FakeBoard::new(),
        store: pmnode_core::RamStore::default(),
        delay: common::CountingDelay::default(),
        console: pmnode_core::QueuedConsole::new(consumer, String::new()),
    };

    let result = pmnode_core::Node::new(
        NodeConfig::default().with_tx_duty_cycle_ms(0),
        &signals,
        parts,
    );
    assert!(matches!(result, Err(NodeError::InvalidConfig { .. })));
}
