//! Command frames sent to the sensor
//!
//! ```text
//! ┌────────┬────────┬────────┬────────────┬──────────┐
//! │ HEAD   │ LEN    │ CMD    │ DATA (0-1) │ CS       │
//! │ 0x68   │ 1 + n  │ opcode │ argument   │ checksum │
//! └────────┴────────┴────────┴────────────┴──────────┘
//! ```
//!
//! The checksum is `(65536 - (HEAD + LEN + CMD + DATA)) mod 256`, with the
//! sum taken modulo 256. The 65536 is how the sensor vendor writes it; only
//! the low byte matters, so the result equals the two's complement of the
//! byte sum. It is kept literally for bit-for-bit compatibility.

use crate::constants::protocol::{
    FRAME_HEADER, MAX_FRAME_LEN, OP_AUTOSEND_DISABLE, OP_AUTOSEND_ENABLE,
    OP_READ_COEFFICIENT, OP_READ_MEASUREMENT, OP_SET_COEFFICIENT,
    OP_START_MEASUREMENT, OP_STOP_MEASUREMENT,
};

/// Requests understood by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Fan and laser on
    StartMeasurement,
    /// Fan and laser off
    StopMeasurement,
    /// Request the latest PM reading
    ReadMeasurement,
    /// Enable unsolicited push mode
    AutoSendEnable,
    /// Disable unsolicited push mode
    AutoSendDisable,
    /// Request the customer coefficient
    ReadCoefficient,
    /// Write the customer coefficient (raw byte, not range checked)
    SetCoefficient(u8),
}

impl Command {
    /// Opcode byte
    pub const fn opcode(&self) -> u8 {
        match self {
            Command::StartMeasurement => OP_START_MEASUREMENT,
            Command::StopMeasurement => OP_STOP_MEASUREMENT,
            Command::ReadMeasurement => OP_READ_MEASUREMENT,
            Command::AutoSendEnable => OP_AUTOSEND_ENABLE,
            Command::AutoSendDisable => OP_AUTOSEND_DISABLE,
            Command::ReadCoefficient => OP_READ_COEFFICIENT,
            Command::SetCoefficient(_) => OP_SET_COEFFICIENT,
        }
    }

    /// Argument byte, if the command carries one
    pub const fn data(&self) -> Option<u8> {
        match self {
            Command::SetCoefficient(value) => Some(*value),
            _ => None,
        }
    }

    /// Encode into a wire frame
    pub fn frame(&self) -> CommandFrame {
        CommandFrame::new(self.opcode(), self.data())
    }
}

/// Encoded command, header to checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl CommandFrame {
    /// Build a frame and append its checksum
    pub fn new(opcode: u8, data: Option<u8>) -> Self {
        let mut bytes = [0u8; MAX_FRAME_LEN];
        let mut len = 0;

        bytes[len] = FRAME_HEADER;
        len += 1;
        bytes[len] = 1 + data.is_some() as u8;
        len += 1;
        bytes[len] = opcode;
        len += 1;
        if let Some(value) = data {
            bytes[len] = value;
            len += 1;
        }
        bytes[len] = checksum(&bytes[..len]);
        len += 1;

        Self { bytes, len }
    }

    /// Wire bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Trailing checksum byte
    pub fn checksum(&self) -> u8 {
        self.bytes[self.len - 1]
    }

    /// Frame length in bytes (4 or 5)
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a frame has at least header, length, opcode and checksum
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Checksum over every byte that precedes it in the frame
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, byte| acc.wrapping_add(*byte));
    ((65536u32 - u32::from(sum)) % 256) as u8
}
