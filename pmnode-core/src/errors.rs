//! Error Types for the Node Control Core
//!
//! ## Design Philosophy
//!
//! The node runs unattended on a battery, so no error in this crate is
//! fatal. Every failure degrades to "log and continue" or "tell the console
//! user and re-prompt". The error type reflects that:
//!
//! 1. **Small Size**: Variants carry a few integers at most, since errors are
//!    returned from every sensor transaction.
//!
//! 2. **No Heap Allocation**: Messages are `&'static str`, never `String`.
//!
//! 3. **Copy Semantics**: Errors implement Copy so the scheduler can log an
//!    error and still match on it afterwards.
//!
//! ## Error Categories
//!
//! ### Sensor Link
//! - `ProtocolFailure`: No response, short response or wrong signature. The
//!   engine deliberately does not tell "silent" from "garbled" apart.
//!
//! ### Console
//! - `ArgumentOutOfRange`: Rejected before anything reaches the sensor
//! - `BufferOverflow`: Line longer than the receive buffer
//! - `Console`: The console UART refused a write
//!
//! ### Scheduling
//! - `NotJoined`: Uplink attempted before the network join completed. The
//!   scheduler re-issues the join and waits for the next tick.
//! - `Timeout`: Setting mode went idle; causes a mode change, not a report.
//!
//! ### Platform
//! - `Storage`: Non-volatile write failed
//! - `InvalidConfig`: A `NodeConfig` that would stall the scheduler
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use pmnode_core::NodeError;
//!
//! fn report(result: Result<(), NodeError>) -> &'static str {
//!     match result {
//!         Ok(()) => "ok",
//!         Err(NodeError::ProtocolFailure) => "check the sensor cable",
//!         Err(NodeError::NotJoined) => "join pending, retry on next tick",
//!         Err(_) => "logged",
//!     }
//! }
//!
//! assert_eq!(report(Err(NodeError::NotJoined)), "join pending, retry on next tick");
//! ```

use thiserror_no_std::Error;

/// Result type for node operations
pub type NodeResult<T> = Result<T, NodeError>;

/// Node errors - kept small and `Copy` for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeError {
    /// Sensor response missing, truncated or carrying the wrong signature
    #[error("Sensor protocol failure")]
    ProtocolFailure,

    /// Console argument outside the accepted range
    #[error("Argument {value} outside range [{min}, {max}]")]
    ArgumentOutOfRange {
        /// Value parsed from the console line
        value: i32,
        /// Smallest accepted value
        min: i32,
        /// Largest accepted value
        max: i32,
    },

    /// Console line exceeded the receive buffer before a terminator arrived
    #[error("Line exceeded {capacity} bytes")]
    BufferOverflow {
        /// Receive buffer capacity in bytes
        capacity: usize,
    },

    /// Uplink requested before the network join completed
    #[error("Network not joined")]
    NotJoined,

    /// Setting mode saw no completed command for too long
    #[error("Setting mode idle for {ticks} ticks")]
    Timeout {
        /// Inactivity ticks counted when the timeout fired
        ticks: u8,
    },

    /// Non-volatile storage rejected a write
    #[error("Non-volatile storage write failed")]
    Storage,

    /// Console UART rejected a write
    #[error("Console write failed")]
    Console,

    /// Configuration cannot drive the scheduler
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration
        reason: &'static str,
    },
}

impl From<core::fmt::Error> for NodeError {
    fn from(_: core::fmt::Error) -> Self {
        NodeError::Console
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for NodeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ProtocolFailure =>
                defmt::write!(fmt, "Sensor protocol failure"),
            Self::ArgumentOutOfRange { value, min, max } =>
                defmt::write!(fmt, "Argument {} outside [{}, {}]", value, min, max),
            Self::BufferOverflow { capacity } =>
                defmt::write!(fmt, "Line exceeded {} bytes", capacity),
            Self::NotJoined =>
                defmt::write!(fmt, "Network not joined"),
            Self::Timeout { ticks } =>
                defmt::write!(fmt, "Setting mode idle for {} ticks", ticks),
            Self::Storage =>
                defmt::write!(fmt, "Storage write failed"),
            Self::Console =>
                defmt::write!(fmt, "Console write failed"),
            Self::InvalidConfig { reason } =>
                defmt::write!(fmt, "Invalid configuration: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn fmt_error_maps_to_console() {
        let err: NodeError = core::fmt::Error.into();
        assert_eq!(err, NodeError::Console);
    }

    #[test]
    fn display_carries_range() {
        let err = NodeError::ArgumentOutOfRange { value: 250, min: 30, max: 200 };
        let mut text: heapless::String<64> = heapless::String::new();
        write!(text, "{}", err).unwrap();
        assert_eq!(text.as_str(), "Argument 250 outside range [30, 200]");
    }
}
