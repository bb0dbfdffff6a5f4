//! Test doubles for the node collaborators
//!
//! - `EchoSensor`: behaves like a Honeywell sensor on the other end of the UART
//! - `RecordingMac`: records joins, uplinks and class requests, replays events
//! - `FakeBoard`: tracks timers, LED and sleep calls
//! - `CountingDelay`: adds up requested delays instead of sleeping
//!
//! plus helpers to assemble a [`Node`] around them.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use heapless::spsc::{Consumer, Producer};

use pmnode_core::downlink::DeviceClass;
use pmnode_core::protocol::checksum;
use pmnode_core::traits::{Board, LoraMac, MacEvent, SensorPort, TimerId};
use pmnode_core::{Node, NodeConfig, NodeParts, QueuedConsole, RamStore, Signals};

/// Console receive queue size (one slot is kept free by the queue)
pub const QUEUE_LEN: usize = 128;

/// Simulated sensor that answers every request like the real device
#[derive(Debug)]
pub struct EchoSensor {
    /// Frames received from the host
    pub frames: Vec<Vec<u8>>,
    /// PM2.5 returned by read requests
    pub pm2_5: u16,
    /// PM10 returned by read requests
    pub pm10_0: u16,
    /// Coefficient held by the device
    pub coefficient: u8,
    /// Fan running
    pub running: bool,
    /// When false, every transmit times out
    pub connected: bool,
    /// When true, measurement responses carry a wrong signature
    pub garble_reads: bool,
    pending: Vec<u8>,
}

impl EchoSensor {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            pm2_5: 42,
            pm10_0: 55,
            coefficient: 100,
            running: false,
            connected: true,
            garble_reads: false,
            pending: Vec::new(),
        }
    }

    pub fn with_reading(mut self, pm2_5: u16, pm10_0: u16) -> Self {
        self.pm2_5 = pm2_5;
        self.pm10_0 = pm10_0;
        self
    }

    pub fn disconnected() -> Self {
        Self { connected: false, ..Self::new() }
    }

    /// Opcodes of every received frame, in order
    pub fn opcodes(&self) -> Vec<u8> {
        self.frames.iter().map(|frame| frame[2]).collect()
    }

    fn respond(&mut self, frame: &[u8]) -> Vec<u8> {
        const ACK: [u8; 2] = [0xA5, 0xA5];

        match frame[2] {
            0x01 => {
                self.running = true;
                ACK.to_vec()
            }
            0x02 => {
                self.running = false;
                ACK.to_vec()
            }
            0x04 => {
                let mut response = vec![0x40, 0x05, 0x04];
                if self.garble_reads {
                    response[0] = 0x00;
                }
                response.extend_from_slice(&self.pm2_5.to_be_bytes());
                response.extend_from_slice(&self.pm10_0.to_be_bytes());
                let cs = checksum(&response);
                response.push(cs);
                response
            }
            0x08 => {
                self.coefficient = frame[3];
                ACK.to_vec()
            }
            0x10 => {
                let mut response = vec![0x40, 0x02, 0x10, self.coefficient];
                let cs = checksum(&response);
                response.push(cs);
                response
            }
            0x20 | 0x40 => ACK.to_vec(),
            _ => Vec::new(),
        }
    }
}

impl SensorPort for EchoSensor {
    type Error = ();

    fn write_all(&mut self, bytes: &[u8], _timeout_ms: u32) -> Result<(), ()> {
        if !self.connected {
            return Err(());
        }
        self.frames.push(bytes.to_vec());
        self.pending = self.respond(bytes);
        Ok(())
    }

    fn read_exact(&mut self, buffer: &mut [u8], _timeout_ms: u32) -> Result<(), ()> {
        let pending = std::mem::take(&mut self.pending);
        if pending.len() != buffer.len() {
            return Err(());
        }
        buffer.copy_from_slice(&pending);
        Ok(())
    }
}

/// One uplink handed to the MAC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentFrame {
    pub payload: Vec<u8>,
    pub port: u8,
    pub confirmed: bool,
}

/// LoRaWAN stack double
#[derive(Debug, Default)]
pub struct RecordingMac {
    pub joined: bool,
    pub join_calls: usize,
    pub process_calls: usize,
    pub sent: Vec<SentFrame>,
    pub class_requests: Vec<DeviceClass>,
    pub events: VecDeque<MacEvent>,
}

impl RecordingMac {
    pub fn joined() -> Self {
        Self { joined: true, ..Self::default() }
    }
}

impl LoraMac for RecordingMac {
    fn is_joined(&self) -> bool {
        self.joined
    }

    fn join(&mut self) {
        self.join_calls += 1;
    }

    fn send(&mut self, payload: &[u8], port: u8, confirmed: bool) {
        self.sent.push(SentFrame {
            payload: payload.to_vec(),
            port,
            confirmed,
        });
    }

    fn request_class(&mut self, class: DeviceClass) {
        self.class_requests.push(class);
    }

    fn process(&mut self) {
        self.process_calls += 1;
    }

    fn next_event(&mut self) -> Option<MacEvent> {
        self.events.pop_front()
    }
}

/// Board double
#[derive(Debug)]
pub struct FakeBoard {
    pub tx_timer: Option<u32>,
    pub setting_timer: Option<u32>,
    pub timer_starts: Vec<(TimerId, u32)>,
    pub timer_stops: Vec<TimerId>,
    pub battery: u8,
    pub led: bool,
    pub sleeps: usize,
    pub button: bool,
}

impl FakeBoard {
    pub fn new() -> Self {
        Self {
            tx_timer: None,
            setting_timer: None,
            timer_starts: Vec::new(),
            timer_stops: Vec::new(),
            battery: 200,
            led: false,
            sleeps: 0,
            button: false,
        }
    }

    pub fn starts_of(&self, timer: TimerId) -> usize {
        self.timer_starts.iter().filter(|(id, _)| *id == timer).count()
    }
}

impl Board for FakeBoard {
    fn start_timer(&mut self, timer: TimerId, period_ms: u32) {
        self.timer_starts.push((timer, period_ms));
        match timer {
            TimerId::Transmit => self.tx_timer = Some(period_ms),
            TimerId::Setting => self.setting_timer = Some(period_ms),
        }
    }

    fn stop_timer(&mut self, timer: TimerId) {
        self.timer_stops.push(timer);
        match timer {
            TimerId::Transmit => self.tx_timer = None,
            TimerId::Setting => self.setting_timer = None,
        }
    }

    fn battery_level(&mut self) -> u8 {
        self.battery
    }

    fn set_status_led(&mut self, on: bool) {
        self.led = on;
    }

    fn enter_low_power(&mut self) {
        self.sleeps += 1;
    }

    fn button_pressed(&mut self) -> bool {
        std::mem::take(&mut self.button)
    }
}

/// Delay double that only adds up what was asked for
#[derive(Debug, Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl CountingDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

pub type TestConsole<'q> = QueuedConsole<'q, String, QUEUE_LEN>;

pub type TestNode<'a> =
    Node<'a, EchoSensor, RecordingMac, FakeBoard, RamStore, CountingDelay, TestConsole<'a>>;

/// Node wired to the doubles
pub fn build_node<'a>(
    config: NodeConfig,
    signals: &'a Signals,
    rx: Consumer<'a, u8, QUEUE_LEN>,
    sensor: EchoSensor,
    mac: RecordingMac,
) -> TestNode<'a> {
    let parts = NodeParts {
        sensor_port: sensor,
        mac,
        board: FakeBoard::new(),
        store: RamStore::default(),
        delay: CountingDelay::default(),
        console: QueuedConsole::new(rx, String::new()),
    };
    Node::new(config, signals, parts).unwrap()
}

/// Queue every byte of `text` as if typed on the terminal
pub fn type_text(producer: &mut Producer<'_, u8, QUEUE_LEN>, text: &[u8]) {
    for byte in text {
        producer.enqueue(*byte).unwrap();
    }
}

/// Everything written to the console so far
pub fn output<'a>(node: &'a TestNode<'_>) -> &'a str {
    node.console().writer().as_str()
}

/// Forget console output written so far
pub fn clear_output(node: &mut TestNode<'_>) {
    node.console_mut().writer_mut().clear();
}
