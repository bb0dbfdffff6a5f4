//! Uplink Payload Encoder
//!
//! ## Layout
//!
//! Every payload opens with the PM channel tag `0x11` and takes one of
//! three shapes:
//!
//! ```text
//! fault        11 BF                       battery low or sensor read failed
//! particulate  11 PM                       PM2.5, µg/m³, saturated to 255
//! location     11 LA LA LA LO LO LO        lat/lon × 1e5, low 24 bits, BE
//! ```
//!
//! In [`PayloadMode::Toggling`] healthy uplinks alternate between the
//! particulate and location shapes, starting with particulate. Fault
//! payloads do not advance the alternation.
//!
//! `0xBF` (191) is reserved for faults, so a genuine reading of 191 is sent
//! as 190. Readings above 255 saturate instead of keeping the low byte, so
//! no reading can wrap onto the fault byte (447 would otherwise send `BF`).

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::lorawan::{
    APP_PORT, DEMO_LATITUDE, DEMO_LONGITUDE, FAULT_BYTE, LOW_BATTERY_THRESHOLD,
    MAX_BATTERY_LEVEL, PAYLOAD_CAPACITY, PM_CHANNEL,
};
use crate::protocol::Measurement;

/// Which shapes healthy uplinks use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadMode {
    /// Alternate particulate and location
    #[default]
    Toggling,
    /// Particulate every time
    ParticulateOnly,
}

/// Fixed node position, degrees × 1e5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeoPoint {
    /// Latitude, north positive
    pub latitude: i32,
    /// Longitude, east positive
    pub longitude: i32,
}

impl GeoPoint {
    /// Demonstration site (13.73654 N, 100.52877 E)
    pub const DEMO: GeoPoint = GeoPoint {
        latitude: DEMO_LATITUDE,
        longitude: DEMO_LONGITUDE,
    };

    /// Low 24 bits of each coordinate, big-endian
    pub fn to_wire(&self) -> [u8; 6] {
        let lat = self.latitude.to_be_bytes();
        let lon = self.longitude.to_be_bytes();
        [lat[1], lat[2], lat[3], lon[1], lon[2], lon[3]]
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::DEMO
    }
}

/// Shape of an encoded payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadKind {
    /// Battery low or sensor failed
    Fault,
    /// PM2.5 reading
    Particulate,
    /// Node position
    Location,
}

/// Encoded uplink, ready for the MAC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UplinkPayload {
    /// Application bytes
    pub data: Vec<u8, PAYLOAD_CAPACITY>,
    /// FPort
    pub port: u8,
    /// Request a network acknowledgement
    pub confirmed: bool,
    /// Which shape `data` has
    pub kind: PayloadKind,
}

impl UplinkPayload {
    /// Application bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Stateful payload builder
#[derive(Debug, Clone)]
pub struct PayloadEncoder {
    mode: PayloadMode,
    location: GeoPoint,
    low_battery_threshold: u8,
    port: u8,
    confirmed: bool,
    particulate_next: bool,
}

impl PayloadEncoder {
    /// Encoder with the factory port, threshold and location
    pub fn new(mode: PayloadMode) -> Self {
        Self {
            mode,
            location: GeoPoint::DEMO,
            low_battery_threshold: LOW_BATTERY_THRESHOLD,
            port: APP_PORT,
            confirmed: false,
            particulate_next: true,
        }
    }

    /// Set the reported position
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = location;
        self
    }

    /// Battery levels below this produce a fault payload
    pub fn with_low_battery_threshold(mut self, threshold: u8) -> Self {
        self.low_battery_threshold = threshold;
        self
    }

    /// FPort and confirmation flag for every uplink
    pub fn with_port(mut self, port: u8, confirmed: bool) -> Self {
        self.port = port;
        self.confirmed = confirmed;
        self
    }

    /// Whether the next healthy payload carries PM2.5
    pub fn particulate_next(&self) -> bool {
        self.particulate_next
    }

    /// Build the next uplink
    ///
    /// `reading` is `None` when the sensor read failed.
    pub fn encode(&mut self, battery_level: u8, reading: Option<Measurement>) -> UplinkPayload {
        let mut data: Vec<u8, PAYLOAD_CAPACITY> = Vec::new();
        // The largest shape is 7 bytes; pushes below cannot fail
        let _ = data.push(PM_CHANNEL);

        let kind = match reading {
            Some(reading) if battery_level >= self.low_battery_threshold => {
                let kind = if self.particulate_next || self.mode == PayloadMode::ParticulateOnly {
                    let _ = data.push(pm_byte(&reading));
                    PayloadKind::Particulate
                } else {
                    let _ = data.extend_from_slice(&self.location.to_wire());
                    PayloadKind::Location
                };
                if self.mode == PayloadMode::Toggling {
                    self.particulate_next = !self.particulate_next;
                }
                kind
            }
            _ => {
                node_info!("fault payload: battery {}, reading ok {}", battery_level, reading.is_some());
                let _ = data.push(FAULT_BYTE);
                PayloadKind::Fault
            }
        };

        UplinkPayload {
            data,
            port: self.port,
            confirmed: self.confirmed,
            kind,
        }
    }
}

impl Default for PayloadEncoder {
    fn default() -> Self {
        Self::new(PayloadMode::default())
    }
}

/// Single PM2.5 byte: sentinel remapped, then saturated
pub fn pm_byte(reading: &Measurement) -> u8 {
    u8::try_from(reading.reported_pm2_5()).unwrap_or(u8::MAX)
}

/// Map a battery voltage onto the LoRaWAN 0-254 scale
///
/// At or above `max_mv` is full (254), at or below `min_mv` is empty (0),
/// linear in between.
pub fn battery_level_from_millivolts(mv: u16, min_mv: u16, max_mv: u16) -> u8 {
    if mv >= max_mv {
        return MAX_BATTERY_LEVEL;
    }
    if mv <= min_mv {
        return 0;
    }

    let span = u32::from(max_mv - min_mv);
    let above = u32::from(mv - min_mv);
    (above * u32::from(MAX_BATTERY_LEVEL) / span) as u8
}
