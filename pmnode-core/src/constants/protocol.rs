//! Honeywell Sensor Protocol Constants
//!
//! Byte values of the request/response protocol spoken by the Honeywell
//! HPM-series particulate sensor over its UART.

// ===== FRAMING =====

/// First byte of every host-to-sensor command.
pub const FRAME_HEADER: u8 = 0x68;

/// Largest command frame: header, length, opcode, one data byte, checksum.
pub const MAX_FRAME_LEN: usize = 5;

// ===== OPCODES =====

/// Start particle measurement (fan and laser on).
pub const OP_START_MEASUREMENT: u8 = 0x01;

/// Stop particle measurement (fan and laser off).
pub const OP_STOP_MEASUREMENT: u8 = 0x02;

/// Read the latest particle measurement.
pub const OP_READ_MEASUREMENT: u8 = 0x04;

/// Write the customer adjustment coefficient.
pub const OP_SET_COEFFICIENT: u8 = 0x08;

/// Read the customer adjustment coefficient.
pub const OP_READ_COEFFICIENT: u8 = 0x10;

/// Disable unsolicited auto-send.
pub const OP_AUTOSEND_DISABLE: u8 = 0x20;

/// Enable unsolicited auto-send.
pub const OP_AUTOSEND_ENABLE: u8 = 0x40;

// ===== RESPONSES =====

/// Positive acknowledgement returned by start, stop, auto-send and
/// set-coefficient commands.
pub const ACK: [u8; 2] = [0xA5, 0xA5];

/// Signature of the 8-byte measurement response.
pub const MEASUREMENT_SIGNATURE: [u8; 3] = [0x40, 0x05, 0x04];

/// Length of the measurement response.
pub const MEASUREMENT_RESPONSE_LEN: usize = 8;

/// Signature of the 5-byte coefficient response.
pub const COEFFICIENT_SIGNATURE: [u8; 3] = [0x40, 0x02, 0x10];

/// Length of the coefficient response.
pub const COEFFICIENT_RESPONSE_LEN: usize = 5;

// ===== COEFFICIENT =====

/// Smallest customer coefficient accepted by the sensor.
pub const COEFFICIENT_MIN: u8 = 30;

/// Largest customer coefficient accepted by the sensor.
pub const COEFFICIENT_MAX: u8 = 200;

/// Factory coefficient (1.00 scaling).
pub const COEFFICIENT_DEFAULT: u8 = 100;

// ===== READINGS =====

/// PM2.5 value reserved on the uplink for "sensor or battery fault".
pub const PM_FAULT_SENTINEL: u16 = 191;

/// Value reported instead of a genuine reading that equals the sentinel.
pub const PM_SENTINEL_SUBSTITUTE: u16 = 190;
