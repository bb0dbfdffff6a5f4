//! Response frames returned by the sensor
//!
//! | Request | Length | Layout |
//! |---|---|---|
//! | start / stop / auto-send / set coefficient | 2 | `A5 A5` |
//! | read measurement | 8 | `40 05 04 PM25_H PM25_L PM10_H PM10_L CS` |
//! | read coefficient | 5 | `40 02 10 COEF CS` |
//!
//! Only the signature bytes are checked. The trailing checksum of data
//! responses is not verified, matching what the sensor firmware expects of
//! its hosts.

use crate::constants::protocol::{
    ACK, COEFFICIENT_SIGNATURE, MEASUREMENT_SIGNATURE, PM_FAULT_SENTINEL,
    PM_SENTINEL_SUBSTITUTE,
};

/// One particle reading, µg/m³
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// PM2.5 concentration
    pub pm2_5: u16,
    /// PM10 concentration
    pub pm10_0: u16,
}

impl Measurement {
    /// PM2.5 as shown to people and the network
    ///
    /// A genuine reading equal to the fault sentinel is nudged down by one
    /// so it cannot be mistaken for a fault report.
    pub fn reported_pm2_5(&self) -> u16 {
        remap_sentinel(self.pm2_5)
    }
}

/// Replace the fault sentinel with its substitute
pub fn remap_sentinel(pm2_5: u16) -> u16 {
    if pm2_5 == PM_FAULT_SENTINEL {
        PM_SENTINEL_SUBSTITUTE
    } else {
        pm2_5
    }
}

/// Whether a 2-byte response is the positive acknowledgement
pub fn is_ack(response: &[u8; 2]) -> bool {
    *response == ACK
}

/// Decode an 8-byte measurement response
pub fn parse_measurement(response: &[u8; 8]) -> Option<Measurement> {
    if response[..3] != MEASUREMENT_SIGNATURE {
        return None;
    }

    Some(Measurement {
        pm2_5: u16::from_be_bytes([response[3], response[4]]),
        pm10_0: u16::from_be_bytes([response[5], response[6]]),
    })
}

/// Decode a 5-byte coefficient response
pub fn parse_coefficient(response: &[u8; 5]) -> Option<u8> {
    if response[..3] != COEFFICIENT_SIGNATURE {
        return None;
    }

    Some(response[3])
}
