//! LoRaWAN Application Constants
//!
//! Ports and payload layout agreed with the network-side decoder.

// ===== PORTS =====

/// Application port for telemetry uplinks and LED downlinks.
///
/// Port 224 is reserved for certification and must not be used.
pub const APP_PORT: u8 = 2;

/// Downlink port that switches the device class.
pub const CLASS_SWITCH_PORT: u8 = 3;

/// Cayenne LPP application port (LED control downlinks).
pub const LPP_APP_PORT: u8 = 99;

// ===== PAYLOAD =====

/// Application data buffer size.
pub const PAYLOAD_CAPACITY: usize = 64;

/// Largest downlink frame kept by the application.
pub const DOWNLINK_CAPACITY: usize = 64;

/// Channel tag that opens every telemetry payload.
pub const PM_CHANNEL: u8 = 0x11;

/// Byte sent in place of a reading when the sensor or battery is at fault.
pub const FAULT_BYTE: u8 = 0xBF;

/// LPP value (byte index 2) that switches the LED on.
pub const LPP_LED_ON: u8 = 100;

// ===== BATTERY =====

/// Battery scale maximum (fully charged), as reported to the MAC.
pub const MAX_BATTERY_LEVEL: u8 = 254;

/// Battery levels below this are reported as a fault.
pub const LOW_BATTERY_THRESHOLD: u8 = 5;

// ===== LOCATION =====

/// Demonstration latitude, degrees × 1e5 (13.73654 N).
pub const DEMO_LATITUDE: i32 = 1_373_654;

/// Demonstration longitude, degrees × 1e5 (100.52877 E).
pub const DEMO_LONGITUDE: i32 = 10_052_877;
