//! Control core for a LoRaWAN particulate-matter node
//!
//! Measures PM2.5/PM10 with a Honeywell-protocol sensor on a UART, reports
//! it over LoRaWAN and offers a serial console for field calibration.
//! Designed for small Cortex-M parts.
//!
//! Key constraints:
//! - No heap, no CAS atomics (Cortex-M0+)
//! - Interrupt handlers only raise signals or queue console bytes
//! - Nothing is fatal; the loop logs and carries on
//!
//! ```no_run
//! use pmnode_core::{Node, NodeConfig, NodeParts, QueuedConsole, RamStore, Signals};
//! # use pmnode_core::traits::{Board, LoraMac, MacEvent, SensorPort, TimerId};
//! # use pmnode_core::downlink::DeviceClass;
//! # struct Uart; struct Mac; struct Bsp; struct Delay;
//! # impl SensorPort for Uart {
//! #     type Error = ();
//! #     fn write_all(&mut self, _: &[u8], _: u32) -> Result<(), ()> { Ok(()) }
//! #     fn read_exact(&mut self, _: &mut [u8], _: u32) -> Result<(), ()> { Err(()) }
//! # }
//! # impl LoraMac for Mac {
//! #     fn is_joined(&self) -> bool { false }
//! #     fn join(&mut self) {}
//! #     fn send(&mut self, _: &[u8], _: u8, _: bool) {}
//! #     fn request_class(&mut self, _: DeviceClass) {}
//! #     fn process(&mut self) {}
//! #     fn next_event(&mut self) -> Option<MacEvent> { None }
//! # }
//! # impl Board for Bsp {
//! #     fn start_timer(&mut self, _: TimerId, _: u32) {}
//! #     fn stop_timer(&mut self, _: TimerId) {}
//! #     fn battery_level(&mut self) -> u8 { 254 }
//! #     fn set_status_led(&mut self, _: bool) {}
//! #     fn enter_low_power(&mut self) {}
//! # }
//! # impl embedded_hal::delay::DelayNs for Delay { fn delay_ns(&mut self, _: u32) {} }
//! # struct Tx;
//! # impl core::fmt::Write for Tx { fn write_str(&mut self, _: &str) -> core::fmt::Result { Ok(()) } }
//!
//! static SIGNALS: Signals = Signals::new();
//!
//! # fn firmware_main(rx: heapless::spsc::Consumer<'static, u8, 128>) -> ! {
//! let parts = NodeParts {
//!     sensor_port: Uart,
//!     mac: Mac,
//!     board: Bsp,
//!     store: RamStore::default(),
//!     delay: Delay,
//!     console: QueuedConsole::new(rx, Tx),
//! };
//!
//! let mut node = Node::new(NodeConfig::default(), &SIGNALS, parts).unwrap();
//! node.start().unwrap();
//! node.run()
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod cli;
pub mod config;
pub mod console;
pub mod constants;
pub mod downlink;
pub mod errors;
pub mod payload;
pub mod protocol;
pub mod scheduler;
pub mod sensor;
pub mod signals;
pub mod storage;
pub mod traits;

// Public API
pub use config::NodeConfig;
pub use console::QueuedConsole;
pub use errors::{NodeError, NodeResult};
pub use payload::{PayloadEncoder, PayloadMode, UplinkPayload};
pub use protocol::{Command, CommandFrame, Measurement};
pub use scheduler::{Node, NodeParts, NodeState, OperatingMode};
pub use sensor::{HoneySensor, SensorState};
pub use signals::{Signal, Signals};
pub use storage::{CoefficientStore, RamStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
