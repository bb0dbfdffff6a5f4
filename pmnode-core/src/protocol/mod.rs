//! Honeywell particulate sensor wire protocol
//!
//! Pure encoding and decoding, no I/O. The transactional engine that drives
//! these frames over a UART lives in [`crate::sensor`].

pub mod frame;
pub mod response;

pub use frame::{checksum, Command, CommandFrame};
pub use response::{
    is_ack, parse_coefficient, parse_measurement, remap_sentinel, Measurement,
};
