//! Platform Abstraction Traits
//!
//! The control core never touches registers. Everything it needs from the
//! board (sensor UART, console UART, LoRaWAN stack, timers, battery ADC,
//! LED, sleep) comes in through the traits below, so the same scheduler runs
//! on the target and against test doubles on the host.
//!
//! ## Execution Context
//!
//! All trait methods are called from the main loop, never from interrupt
//! context. Interrupt handlers talk to the core exclusively through
//! [`crate::signals::Signals`] and the console byte queue.
//!
//! ## Blocking Contract
//!
//! [`SensorPort`] methods block for at most the given timeout. That stall is
//! intentional: a sensor transaction is only correct if nothing else runs
//! between the request and its response.

use core::fmt;

use heapless::Vec;

use crate::constants::lorawan::DOWNLINK_CAPACITY;
use crate::downlink::DeviceClass;
use crate::traits::stream::ByteSource;

/// Blocking UART link to the particulate sensor
///
/// ## Example Implementation
///
/// ```rust
/// use pmnode_core::traits::SensorPort;
///
/// /// Sensor that never answers.
/// struct Disconnected;
///
/// impl SensorPort for Disconnected {
///     type Error = ();
///
///     fn write_all(&mut self, _bytes: &[u8], _timeout_ms: u32) -> Result<(), ()> {
///         Ok(())
///     }
///
///     fn read_exact(&mut self, _buffer: &mut [u8], _timeout_ms: u32) -> Result<(), ()> {
///         Err(()) // timed out
///     }
/// }
/// ```
pub trait SensorPort {
    /// Transport error (timeout, framing, overrun)
    type Error: fmt::Debug;

    /// Transmit every byte, giving up after `timeout_ms`
    fn write_all(&mut self, bytes: &[u8], timeout_ms: u32) -> Result<(), Self::Error>;

    /// Fill `buffer` completely, giving up after `timeout_ms`
    fn read_exact(&mut self, buffer: &mut [u8], timeout_ms: u32) -> Result<(), Self::Error>;
}

/// Setting-mode console: a text sink plus the received byte stream
pub trait Console: fmt::Write + ByteSource {}

impl<T: fmt::Write + ByteSource> Console for T {}

/// Timers owned by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    /// Periodic uplink timer (raises [`crate::signals::Signal::TxTimer`])
    Transmit,
    /// Setting-mode inactivity tick (raises [`crate::signals::Signal::SettingTick`])
    Setting,
}

/// Board services used by the scheduler
///
/// Timers are periodic: once started they keep raising their signal every
/// `period_ms` until stopped, independent of what the main loop does.
pub trait Board {
    /// Start (or restart) a periodic timer
    fn start_timer(&mut self, timer: TimerId, period_ms: u32);

    /// Stop a timer; stopping an idle timer is a no-op
    fn stop_timer(&mut self, timer: TimerId);

    /// Battery level on the LoRaWAN scale: 0 (empty) to 254 (full)
    fn battery_level(&mut self) -> u8;

    /// Drive the status LED
    fn set_status_led(&mut self, on: bool);

    /// Sleep until the next interrupt
    ///
    /// Implementations must not sleep if an interrupt became pending after
    /// the caller checked for work (mask interrupts, re-check, then WFI).
    fn enter_low_power(&mut self);

    /// Level of the setting-mode button, for boards without an edge interrupt
    fn button_pressed(&mut self) -> bool {
        false
    }
}

/// Notifications delivered by the LoRaWAN stack after [`LoraMac::process`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacEvent {
    /// Network join completed
    Joined,
    /// Class switch completed
    ClassConfirmed(DeviceClass),
    /// Network server asked for an uplink (e.g. pending MAC commands)
    TxNeeded,
    /// Application downlink received
    Downlink {
        /// FPort of the frame
        port: u8,
        /// Frame payload, truncated to the application buffer
        data: Vec<u8, DOWNLINK_CAPACITY>,
    },
}

/// LoRaWAN stack as seen by the application
pub trait LoraMac {
    /// Whether the network join has completed
    fn is_joined(&self) -> bool;

    /// Start (or retry) the network join
    fn join(&mut self);

    /// Queue an uplink
    fn send(&mut self, payload: &[u8], port: u8, confirmed: bool);

    /// Ask the network for a device class switch
    fn request_class(&mut self, class: DeviceClass);

    /// Run the deferred MAC state machine
    ///
    /// Called from the main loop after the stack raised
    /// [`crate::signals::Signal::MacProcess`].
    fn process(&mut self);

    /// Next notification produced by the last `process()` call
    fn next_event(&mut self) -> Option<MacEvent>;
}
