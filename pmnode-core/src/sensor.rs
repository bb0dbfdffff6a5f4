//! Particulate Sensor Protocol Engine
//!
//! ## Overview
//!
//! [`HoneySensor`] drives a Honeywell-protocol particulate sensor over a
//! dedicated UART. Every public operation is exactly one transaction:
//!
//! ```text
//! host                       sensor
//!  │ ── CommandFrame ──────→ │   write_all, 100 ms
//!  │ ←──────── response ──── │   read_exact, 100 ms
//! ```
//!
//! The engine takes `&mut self` for every transaction, so two requests can
//! never interleave on the wire.
//!
//! ## Failure Model
//!
//! Transmit timeouts, receive timeouts, short reads and signature
//! mismatches are all reported as [`NodeError::ProtocolFailure`]. The
//! transport error itself is logged at debug level and then dropped.
//!
//! ## Coefficient Mirror
//!
//! `set_coefficient` sends the raw byte whatever its value. When the sensor
//! acknowledges an out-of-range byte the in-memory mirror falls back to the
//! factory default instead of the value actually written, so the mirror and
//! the device can disagree until the next `read_coefficient`. Console input
//! is range-checked before it gets here, so only direct callers can hit this.

use embedded_hal::delay::DelayNs;

use crate::constants::protocol::{
    COEFFICIENT_DEFAULT, COEFFICIENT_MAX, COEFFICIENT_MIN, COEFFICIENT_RESPONSE_LEN,
    MEASUREMENT_RESPONSE_LEN,
};
use crate::constants::timing::{SENSOR_RESPONSE_TIMEOUT_MS, SENSOR_TRANSMIT_TIMEOUT_MS};
use crate::errors::{NodeError, NodeResult};
use crate::protocol::{self, Command, Measurement};
use crate::traits::SensorPort;

/// Last known sensor values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorState {
    /// Last PM2.5/PM10 reading
    pub reading: Measurement,
    /// Customer coefficient mirror
    pub coefficient: u8,
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            reading: Measurement::default(),
            coefficient: COEFFICIENT_DEFAULT,
        }
    }
}

/// Honeywell HPM-series sensor on a blocking UART
#[derive(Debug)]
pub struct HoneySensor<P> {
    port: P,
    state: SensorState,
}

impl<P: SensorPort> HoneySensor<P> {
    /// Wrap a port; state starts at defaults, nothing is sent
    pub fn new(port: P) -> Self {
        Self {
            port,
            state: SensorState::default(),
        }
    }

    /// Reset the mirror, then stop, disable auto-send and read the coefficient
    ///
    /// Stops at the first failing step.
    pub fn initialize(&mut self) -> NodeResult<()> {
        self.state = SensorState::default();

        self.stop()?;
        self.set_autosend(false)?;
        self.read_coefficient()?;

        node_debug!("sensor initialized, coefficient {}", self.state.coefficient);
        Ok(())
    }

    /// Fan and laser on
    pub fn start(&mut self) -> NodeResult<()> {
        self.command_with_ack(Command::StartMeasurement)
    }

    /// Fan and laser off
    ///
    /// Also serves as the connection probe behind the `check` command.
    pub fn stop(&mut self) -> NodeResult<()> {
        self.command_with_ack(Command::StopMeasurement)
    }

    /// Fetch the current reading and update the mirror
    pub fn read(&mut self) -> NodeResult<Measurement> {
        let response: [u8; MEASUREMENT_RESPONSE_LEN] =
            self.transact(Command::ReadMeasurement)?;

        let reading = protocol::parse_measurement(&response).ok_or_else(|| {
            node_debug!("measurement signature mismatch: {:?}", response);
            NodeError::ProtocolFailure
        })?;

        self.state.reading = reading;
        Ok(reading)
    }

    /// Enable or disable unsolicited readings
    pub fn set_autosend(&mut self, enabled: bool) -> NodeResult<()> {
        let command = if enabled {
            Command::AutoSendEnable
        } else {
            Command::AutoSendDisable
        };
        self.command_with_ack(command)
    }

    /// Write the customer coefficient
    pub fn set_coefficient(&mut self, value: u8) -> NodeResult<()> {
        self.command_with_ack(Command::SetCoefficient(value))?;

        self.state.coefficient = if (COEFFICIENT_MIN..=COEFFICIENT_MAX).contains(&value) {
            value
        } else {
            node_warn!("coefficient {} out of range, mirror reset to default", value);
            COEFFICIENT_DEFAULT
        };
        Ok(())
    }

    /// Read the customer coefficient back from the sensor
    ///
    /// The returned byte is stored as-is, even outside the valid range.
    pub fn read_coefficient(&mut self) -> NodeResult<u8> {
        let response: [u8; COEFFICIENT_RESPONSE_LEN] =
            self.transact(Command::ReadCoefficient)?;

        let coefficient = protocol::parse_coefficient(&response).ok_or_else(|| {
            node_debug!("coefficient signature mismatch: {:?}", response);
            NodeError::ProtocolFailure
        })?;

        self.state.coefficient = coefficient;
        Ok(coefficient)
    }

    /// One full measurement: start, warm up, read, stop
    ///
    /// A failed start is logged and the cycle continues. The stop is sent
    /// whatever the read returned; its own failure is logged and the read
    /// result is returned.
    pub fn measure<D: DelayNs>(&mut self, delay: &mut D, warmup_ms: u32) -> NodeResult<Measurement> {
        if let Err(err) = self.start() {
            node_warn!("sensor start failed: {}", err);
        }

        delay.delay_ms(warmup_ms);
        let result = self.read();

        if let Err(err) = self.stop() {
            node_warn!("sensor stop failed: {}", err);
        }

        result
    }

    /// Last known values
    pub fn state(&self) -> &SensorState {
        &self.state
    }

    /// Cached coefficient
    pub fn coefficient(&self) -> u8 {
        self.state.coefficient
    }

    /// Cached reading
    pub fn last_reading(&self) -> Measurement {
        self.state.reading
    }

    /// Underlying port
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Underlying port, mutable
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Release the port
    pub fn release(self) -> P {
        self.port
    }

    fn command_with_ack(&mut self, command: Command) -> NodeResult<()> {
        let response: [u8; 2] = self.transact(command)?;
        if protocol::is_ack(&response) {
            Ok(())
        } else {
            node_debug!("{:?} not acknowledged: {:?}", command, response);
            Err(NodeError::ProtocolFailure)
        }
    }

    fn transact<const N: usize>(&mut self, command: Command) -> NodeResult<[u8; N]> {
        let frame = command.frame();

        self.port
            .write_all(frame.as_bytes(), SENSOR_TRANSMIT_TIMEOUT_MS)
            .map_err(|_err| {
                node_debug!("{:?} transmit failed", command);
                NodeError::ProtocolFailure
            })?;

        let mut response = [0u8; N];
        self.port
            .read_exact(&mut response, SENSOR_RESPONSE_TIMEOUT_MS)
            .map_err(|_err| {
                node_debug!("{:?} receive failed", command);
                NodeError::ProtocolFailure
            })?;

        Ok(response)
    }
}
