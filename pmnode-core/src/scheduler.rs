//! Mode Scheduler and Main Control Loop
//!
//! ## Overview
//!
//! [`Node`] owns every collaborator and runs a single cooperative loop.
//! Interrupt handlers only raise [`Signals`] or queue console bytes; each
//! call to [`Node::poll`] looks at what is pending, runs it to completion
//! and goes back to sleep when nothing is left.
//!
//! ## State Machine
//!
//! ```text
//!                 tx signal                       joined
//!   ┌──────┐ ───────────────→ ┌───────────┐  start, warmup, read,
//!   │ Idle │                  │ Measuring │  encode, send, stop
//!   └──────┘ ←─────────────── └───────────┘
//!     │  ↑        done / not joined (join retried)
//!     │  │
//!     │  │ exit / timeout: stop tick timer, re-arm tx timer
//!     │  │
//!     │  └──────────────┐
//!     │ button          │
//!     ↓                 │
//!   ┌────────────────┐  25 ticks  ┌──────────┐
//!   │ AwaitingInput  │ ─────────→ │ TimedOut │
//!   └────────────────┘            └──────────┘
//! ```
//!
//! `Idle` and `Measuring` form normal mode, `AwaitingInput` and `TimedOut`
//! setting mode. The LoRaWAN stack is serviced in both.
//!
//! ## Sleeping
//!
//! The loop enters low power only when no signal is raised, no console byte
//! is queued in setting mode and no overflow is waiting to be reported. The
//! board must close the race between that check and the sleep instruction
//! (see [`Board::enter_low_power`]).

use core::fmt::Write;

use embedded_hal::delay::DelayNs;

use crate::cli::{self, CommandContext, ConsoleCommand, LineBuffer, LineEvent, Outcome};
use crate::config::NodeConfig;
use crate::constants::console::{BACKSPACE_ECHO, MSG_BUFFER_OVERFLOW, MSG_SETTING_TIMEOUT, PROMPT};
use crate::downlink::{self, DownlinkAction, DownlinkPorts};
use crate::errors::{NodeError, NodeResult};
use crate::payload::PayloadEncoder;
use crate::sensor::HoneySensor;
use crate::signals::{Signal, Signals};
use crate::storage::CoefficientStore;
use crate::traits::{Board, ByteSource, Console, LoraMac, MacEvent, SensorPort, TimerId};

/// Where the node is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeState {
    /// Normal mode, waiting for the next uplink
    Idle,
    /// Normal mode, measurement cycle running
    Measuring,
    /// Setting mode, waiting for console input
    AwaitingInput {
        /// Ticks since the last received byte
        idle_ticks: u8,
    },
    /// Setting mode, inactivity limit reached
    TimedOut,
}

/// Coarse operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Telemetry
    Normal,
    /// Interactive console
    Setting,
}

impl NodeState {
    /// Mode this state belongs to
    pub fn mode(&self) -> OperatingMode {
        match self {
            NodeState::Idle | NodeState::Measuring => OperatingMode::Normal,
            NodeState::AwaitingInput { .. } | NodeState::TimedOut => OperatingMode::Setting,
        }
    }
}

/// Collaborators handed to [`Node::new`]
pub struct NodeParts<P, M, B, S, D, C> {
    /// Sensor UART
    pub sensor_port: P,
    /// LoRaWAN stack
    pub mac: M,
    /// Timers, battery, LED, sleep
    pub board: B,
    /// Non-volatile coefficient
    pub store: S,
    /// Blocking delay for the sensor warmup
    pub delay: D,
    /// Setting-mode console
    pub console: C,
}

/// The node control core
pub struct Node<'a, P, M, B, S, D, C> {
    config: NodeConfig,
    signals: &'a Signals,
    sensor: HoneySensor<P>,
    mac: M,
    board: B,
    store: S,
    delay: D,
    console: C,
    line: LineBuffer,
    encoder: PayloadEncoder,
    downlink_ports: DownlinkPorts,
    state: NodeState,
    tx_armed: bool,
    led_on: bool,
}

impl<'a, P, M, B, S, D, C> Node<'a, P, M, B, S, D, C>
where
    P: SensorPort,
    M: LoraMac,
    B: Board,
    S: CoefficientStore,
    D: DelayNs,
    C: Console,
{
    /// Assemble a node; nothing is sent until [`Node::start`]
    pub fn new(
        config: NodeConfig,
        signals: &'a Signals,
        parts: NodeParts<P, M, B, S, D, C>,
    ) -> NodeResult<Self> {
        config.validate()?;

        Ok(Self {
            encoder: config.payload_encoder(),
            downlink_ports: config.downlink_ports(),
            config,
            signals,
            sensor: HoneySensor::new(parts.sensor_port),
            mac: parts.mac,
            board: parts.board,
            store: parts.store,
            delay: parts.delay,
            console: parts.console,
            line: LineBuffer::new(),
            state: NodeState::Idle,
            tx_armed: false,
            led_on: false,
        })
    }

    /// Boot sequence
    ///
    /// Initializes the sensor (a failure is logged, not fatal), logs the
    /// stored coefficient, requests the network join, then either arms the
    /// uplink timer or enters setting mode.
    pub fn start(&mut self) -> NodeResult<()> {
        match self.sensor.initialize() {
            Ok(()) => node_info!("sensor ready, coefficient {}", self.sensor.coefficient()),
            Err(err) => node_warn!("sensor initialization failed: {}", err),
        }

        let stored = self.store.load();
        node_info!("stored coefficient {}", stored);

        self.mac.join();

        if self.config.start_in_setting_mode {
            self.enter_setting_mode()
        } else {
            self.arm_tx_timer();
            Ok(())
        }
    }

    /// Run forever, logging errors
    pub fn run(&mut self) -> ! {
        loop {
            if let Err(err) = self.poll() {
                node_warn!("loop iteration failed: {}", err);
            }
        }
    }

    /// One loop iteration
    ///
    /// Returns the first error the iteration ran into; the iteration is
    /// completed regardless.
    pub fn poll(&mut self) -> NodeResult<()> {
        self.service_mac();

        let result = match self.state.mode() {
            OperatingMode::Normal => self.poll_normal(),
            OperatingMode::Setting => self.poll_setting(),
        };

        if !self.work_pending() {
            self.board.enter_low_power();
        }

        result
    }

    fn poll_normal(&mut self) -> NodeResult<()> {
        self.signals.clear(Signal::SettingTick);

        let button = self.signals.take(Signal::Button)
            || (self.config.poll_button && self.board.button_pressed());
        if button {
            return self.enter_setting_mode();
        }

        if self.signals.take(Signal::TxTimer) {
            match self.measurement_cycle() {
                Ok(()) => {}
                Err(NodeError::NotJoined) => node_info!("{}, join retried", NodeError::NotJoined),
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }

    /// Measure and send one uplink
    ///
    /// When the network has not been joined the join is retried and
    /// [`NodeError::NotJoined`] returned, without powering the sensor.
    /// Only called from normal mode.
    fn measurement_cycle(&mut self) -> NodeResult<()> {
        if !self.mac.is_joined() {
            self.mac.join();
            return Err(NodeError::NotJoined);
        }

        self.state = NodeState::Measuring;
        node_debug!("measurement cycle");

        if let Err(err) = self.sensor.start() {
            node_warn!("sensor start failed: {}", err);
        }
        self.delay.delay_ms(self.config.warmup_ms);

        let reading = match self.sensor.read() {
            Ok(reading) => Some(reading),
            Err(err) => {
                node_warn!("sensor read failed: {}", err);
                None
            }
        };

        let battery = self.board.battery_level();
        let payload = self.encoder.encode(battery, reading);
        node_info!("uplink {:?} on port {}", payload.kind, payload.port);
        self.mac.send(payload.as_bytes(), payload.port, payload.confirmed);

        if let Err(err) = self.sensor.stop() {
            node_warn!("sensor stop failed: {}", err);
        }

        self.state = NodeState::Idle;
        Ok(())
    }

    fn poll_setting(&mut self) -> NodeResult<()> {
        // Stale normal-mode signals; the button does nothing here
        self.signals.clear(Signal::Button);
        self.signals.clear(Signal::TxTimer);

        if self.line.is_overflowed() {
            node_warn!("console line overflow");
            self.line.clear();
            self.console.discard_pending();
            self.console.write_str(MSG_BUFFER_OVERFLOW)?;
        }

        if self.signals.take(Signal::SettingTick) {
            // A byte that arrived before the tick counts as activity
            if self.console.has_pending() {
                self.state = NodeState::AwaitingInput { idle_ticks: 0 };
            }
            self.tick();
        }
        if self.state == NodeState::TimedOut {
            return self.leave_setting_mode(true);
        }

        while let Ok(byte) = self.console.poll_byte() {
            self.state = NodeState::AwaitingInput { idle_ticks: 0 };

            match self.line.push(byte) {
                Ok(LineEvent::Stored(byte)) => {
                    if byte.is_ascii() {
                        self.console.write_char(char::from(byte))?;
                    }
                }
                Ok(LineEvent::Erased) => self.console.write_str(BACKSPACE_ECHO)?,
                Ok(LineEvent::Ignored) => {}
                Ok(LineEvent::Complete) => {
                    if self.process_line()? == Outcome::ExitSettingMode {
                        return self.leave_setting_mode(false);
                    }
                }
                // Reported on the next iteration
                Err(_) => break,
            }
        }

        Ok(())
    }

    fn tick(&mut self) {
        if let NodeState::AwaitingInput { idle_ticks } = self.state {
            let idle_ticks = idle_ticks.saturating_add(1);
            self.state = if idle_ticks >= self.config.setting_timeout_ticks {
                node_info!("{}", NodeError::Timeout { ticks: idle_ticks });
                NodeState::TimedOut
            } else {
                NodeState::AwaitingInput { idle_ticks }
            };
        }
    }

    fn process_line(&mut self) -> NodeResult<Outcome> {
        let command = ConsoleCommand::from_line(self.line.line().unwrap_or_default());
        self.line.clear();

        let mut ctx = CommandContext {
            sensor: &mut self.sensor,
            store: &mut self.store,
            delay: &mut self.delay,
            warmup_ms: self.config.warmup_ms,
        };
        cli::execute(command, &mut ctx, &mut self.console)
    }

    /// Switch to setting mode as if the button had been pressed
    pub fn enter_setting_mode(&mut self) -> NodeResult<()> {
        node_info!("entering setting mode");

        self.board.stop_timer(TimerId::Transmit);
        self.tx_armed = false;
        self.signals.clear(Signal::TxTimer);

        self.board.start_timer(TimerId::Setting, self.config.setting_tick_ms);
        self.signals.clear(Signal::SettingTick);

        self.line.clear();
        self.console.discard_pending();
        self.state = NodeState::AwaitingInput { idle_ticks: 0 };

        self.console.write_str(PROMPT)?;
        Ok(())
    }

    fn leave_setting_mode(&mut self, timed_out: bool) -> NodeResult<()> {
        let notice = if timed_out {
            self.console.write_str(MSG_SETTING_TIMEOUT)
        } else {
            Ok(())
        };

        self.board.stop_timer(TimerId::Setting);
        self.signals.clear(Signal::SettingTick);
        self.line.clear();
        self.console.discard_pending();

        self.state = NodeState::Idle;
        self.arm_tx_timer();
        node_info!("back to normal mode");

        notice.map_err(NodeError::from)
    }

    fn arm_tx_timer(&mut self) {
        self.board.start_timer(TimerId::Transmit, self.config.tx_duty_cycle_ms);
        self.tx_armed = true;
        if self.config.transmit_on_arm {
            self.signals.raise(Signal::TxTimer);
        }
    }

    fn service_mac(&mut self) {
        if self.signals.take(Signal::MacProcess) {
            self.mac.process();
        }
        while let Some(event) = self.mac.next_event() {
            self.handle_mac_event(event);
        }
    }

    fn handle_mac_event(&mut self, event: MacEvent) {
        match event {
            MacEvent::Joined => {
                node_info!("joined, requesting class {:?}", self.config.default_class);
                self.mac.request_class(self.config.default_class);
            }
            MacEvent::ClassConfirmed(class) => {
                node_info!("switched to class {:?}", class);
                self.mac.send(&[], self.config.app_port, false);
            }
            MacEvent::TxNeeded => {
                self.mac.send(&[], self.config.app_port, false);
            }
            MacEvent::Downlink { port, data } => {
                node_debug!("downlink on port {}", port);
                match downlink::decode(&self.downlink_ports, port, &data) {
                    Some(DownlinkAction::SwitchClass(class)) => self.mac.request_class(class),
                    Some(DownlinkAction::SetLed(on)) => {
                        node_info!("status LED {}", on);
                        self.led_on = on;
                        self.board.set_status_led(on);
                    }
                    None => {}
                }
            }
        }
    }

    fn work_pending(&self) -> bool {
        if self.signals.any_pending() {
            return true;
        }
        match self.state.mode() {
            OperatingMode::Setting => self.line.is_overflowed() || self.console.has_pending(),
            OperatingMode::Normal => false,
        }
    }

    /// Current state
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Current mode
    pub fn mode(&self) -> OperatingMode {
        self.state.mode()
    }

    /// Whether the uplink timer is running
    pub fn tx_armed(&self) -> bool {
        self.tx_armed
    }

    /// Last LED state requested by a downlink
    pub fn led_on(&self) -> bool {
        self.led_on
    }

    /// Active configuration
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Console line buffer
    pub fn line(&self) -> &LineBuffer {
        &self.line
    }

    /// Sensor engine
    pub fn sensor(&self) -> &HoneySensor<P> {
        &self.sensor
    }

    /// Sensor engine, mutable
    pub fn sensor_mut(&mut self) -> &mut HoneySensor<P> {
        &mut self.sensor
    }

    /// LoRaWAN stack
    pub fn mac(&self) -> &M {
        &self.mac
    }

    /// LoRaWAN stack, mutable
    pub fn mac_mut(&mut self) -> &mut M {
        &mut self.mac
    }

    /// Board services
    pub fn board(&self) -> &B {
        &self.board
    }

    /// Board services, mutable
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Coefficient store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Delay provider
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Console
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Console, mutable
    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }
}
