//! Core Traits and Abstractions
//!
//! - [`hal`] - Platform collaborators (sensor UART, console, board, LoRaWAN)
//! - [`stream`] - Non-blocking byte sources fed by interrupt handlers
//!
//! The scheduler is generic over these traits and uses static dispatch
//! throughout; a firmware build monomorphizes exactly one implementation of
//! each.

pub mod hal;
pub mod stream;

pub use hal::{Board, Console, LoraMac, MacEvent, SensorPort, TimerId};
pub use stream::ByteSource;
