//! Application downlink decoding
//!
//! | Port | Length | Meaning |
//! |---|---|---|
//! | class switch (3) | 1 | `0` → class A, `1` → class B, `2` → class C |
//! | application (2) | 1 | status LED = bit 0 |
//! | LPP (99) | ≥ 3 | status LED = (`byte[2] == 100`) |
//!
//! Anything else is ignored.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::lorawan::LPP_LED_ON;

/// LoRaWAN device class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceClass {
    /// Receive windows only after uplinks
    #[default]
    A,
    /// Scheduled ping slots
    B,
    /// Continuous receive
    C,
}

impl DeviceClass {
    /// Decode the class-switch downlink byte
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(DeviceClass::A),
            1 => Some(DeviceClass::B),
            2 => Some(DeviceClass::C),
            _ => None,
        }
    }
}

/// What a downlink asks the node to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DownlinkAction {
    /// Request a device class switch from the MAC
    SwitchClass(DeviceClass),
    /// Drive the status LED
    SetLed(bool),
}

/// Ports the decoder listens on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownlinkPorts {
    /// Telemetry / LED port
    pub app: u8,
    /// Device class switch port
    pub class_switch: u8,
    /// Cayenne LPP port
    pub lpp: u8,
}

/// Map a received frame onto an action
pub fn decode(ports: &DownlinkPorts, port: u8, data: &[u8]) -> Option<DownlinkAction> {
    if port == ports.class_switch {
        return match data {
            [byte] => DeviceClass::from_wire(*byte).map(DownlinkAction::SwitchClass),
            _ => None,
        };
    }

    if port == ports.app {
        return match data {
            [byte] => Some(DownlinkAction::SetLed(byte & 0x01 != 0)),
            _ => None,
        };
    }

    if port == ports.lpp && data.len() >= 3 {
        return Some(DownlinkAction::SetLed(data[2] == LPP_LED_ON));
    }

    None
}
