//! Node configuration
//!
//! [`NodeConfig::default`] reproduces the factory firmware. Deployments
//! tweak it with the `with_*` builders and must call
//! [`NodeConfig::validate`] before handing it to the scheduler.
//!
//! ```rust
//! use pmnode_core::config::NodeConfig;
//! use pmnode_core::payload::PayloadMode;
//!
//! let config = NodeConfig::default()
//!     .with_tx_duty_cycle_ms(120_000)
//!     .with_payload_mode(PayloadMode::ParticulateOnly);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.tx_duty_cycle().to_secs(), 120);
//! ```

use fugit::MillisDurationU32;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::lorawan::{APP_PORT, CLASS_SWITCH_PORT, LOW_BATTERY_THRESHOLD, LPP_APP_PORT};
use crate::constants::timing::{
    SENSOR_WARMUP_MS, SETTING_TICK_MS, SETTING_TIMEOUT_TICKS, TX_DUTY_CYCLE_MS,
};
use crate::downlink::{DeviceClass, DownlinkPorts};
use crate::errors::{NodeError, NodeResult};
use crate::payload::{GeoPoint, PayloadEncoder, PayloadMode};

/// LoRaWAN reserves port 0 for MAC commands and 224 and up for test and
/// future use.
const MAX_APP_PORT: u8 = 223;

/// Tunables of one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeConfig {
    /// Period between telemetry uplinks
    pub tx_duty_cycle_ms: u32,
    /// Setting-mode inactivity tick
    pub setting_tick_ms: u32,
    /// Ticks without input before setting mode exits
    pub setting_timeout_ticks: u8,
    /// Sensor fan spin-up before a reading
    pub warmup_ms: u32,
    /// Telemetry and LED downlink port
    pub app_port: u8,
    /// Cayenne LPP downlink port
    pub lpp_port: u8,
    /// Class switch downlink port
    pub class_switch_port: u8,
    /// Ask for network acknowledgements on telemetry
    pub confirmed_uplinks: bool,
    /// Class requested after joining
    pub default_class: DeviceClass,
    /// Battery levels below this are sent as a fault
    pub low_battery_threshold: u8,
    /// Payload shapes used by healthy uplinks
    pub payload_mode: PayloadMode,
    /// Position sent in location payloads
    pub location: GeoPoint,
    /// Send immediately whenever the uplink timer is (re)armed
    pub transmit_on_arm: bool,
    /// Boot into setting mode instead of telemetry
    pub start_in_setting_mode: bool,
    /// Poll the button level instead of waiting for an edge interrupt
    pub poll_button: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            tx_duty_cycle_ms: TX_DUTY_CYCLE_MS,
            setting_tick_ms: SETTING_TICK_MS,
            setting_timeout_ticks: SETTING_TIMEOUT_TICKS,
            warmup_ms: SENSOR_WARMUP_MS,
            app_port: APP_PORT,
            lpp_port: LPP_APP_PORT,
            class_switch_port: CLASS_SWITCH_PORT,
            confirmed_uplinks: false,
            default_class: DeviceClass::A,
            low_battery_threshold: LOW_BATTERY_THRESHOLD,
            payload_mode: PayloadMode::Toggling,
            location: GeoPoint::DEMO,
            transmit_on_arm: true,
            start_in_setting_mode: false,
            poll_button: false,
        }
    }
}

impl NodeConfig {
    /// Set the uplink period
    pub fn with_tx_duty_cycle_ms(mut self, period_ms: u32) -> Self {
        self.tx_duty_cycle_ms = period_ms;
        self
    }

    /// Set the setting-mode tick and the number of ticks before timeout
    pub fn with_setting_timeout(mut self, tick_ms: u32, ticks: u8) -> Self {
        self.setting_tick_ms = tick_ms;
        self.setting_timeout_ticks = ticks;
        self
    }

    /// Set the sensor warmup
    pub fn with_warmup_ms(mut self, warmup_ms: u32) -> Self {
        self.warmup_ms = warmup_ms;
        self
    }

    /// Set the application, LPP and class switch ports
    pub fn with_ports(mut self, app: u8, lpp: u8, class_switch: u8) -> Self {
        self.app_port = app;
        self.lpp_port = lpp;
        self.class_switch_port = class_switch;
        self
    }

    /// Request acknowledgements for telemetry
    pub fn with_confirmed_uplinks(mut self, confirmed: bool) -> Self {
        self.confirmed_uplinks = confirmed;
        self
    }

    /// Class requested after joining
    pub fn with_default_class(mut self, class: DeviceClass) -> Self {
        self.default_class = class;
        self
    }

    /// Battery fault threshold
    pub fn with_low_battery_threshold(mut self, threshold: u8) -> Self {
        self.low_battery_threshold = threshold;
        self
    }

    /// Payload alternation
    pub fn with_payload_mode(mut self, mode: PayloadMode) -> Self {
        self.payload_mode = mode;
        self
    }

    /// Reported position
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = location;
        self
    }

    /// Immediate uplink when the timer is armed
    pub fn with_transmit_on_arm(mut self, enabled: bool) -> Self {
        self.transmit_on_arm = enabled;
        self
    }

    /// Boot into setting mode
    pub fn with_start_in_setting_mode(mut self, enabled: bool) -> Self {
        self.start_in_setting_mode = enabled;
        self
    }

    /// Poll the button level every loop
    pub fn with_poll_button(mut self, enabled: bool) -> Self {
        self.poll_button = enabled;
        self
    }

    /// Uplink period
    pub fn tx_duty_cycle(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(self.tx_duty_cycle_ms)
    }

    /// Setting-mode tick
    pub fn setting_tick(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(self.setting_tick_ms)
    }

    /// Total setting-mode idle time before timeout
    pub fn setting_timeout(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(
            self.setting_tick_ms
                .saturating_mul(u32::from(self.setting_timeout_ticks)),
        )
    }

    /// Sensor warmup
    pub fn warmup(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(self.warmup_ms)
    }

    /// Ports for the downlink decoder
    pub fn downlink_ports(&self) -> DownlinkPorts {
        DownlinkPorts {
            app: self.app_port,
            class_switch: self.class_switch_port,
            lpp: self.lpp_port,
        }
    }

    /// Payload encoder matching this configuration
    pub fn payload_encoder(&self) -> PayloadEncoder {
        PayloadEncoder::new(self.payload_mode)
            .with_location(self.location)
            .with_low_battery_threshold(self.low_battery_threshold)
            .with_port(self.app_port, self.confirmed_uplinks)
    }

    /// Reject configurations the scheduler cannot run
    pub fn validate(&self) -> NodeResult<()> {
        if self.tx_duty_cycle_ms == 0 {
            return Err(NodeError::InvalidConfig { reason: "tx duty cycle is zero" });
        }
        if self.setting_tick_ms == 0 {
            return Err(NodeError::InvalidConfig { reason: "setting tick is zero" });
        }
        if self.setting_timeout_ticks == 0 {
            return Err(NodeError::InvalidConfig { reason: "setting timeout is zero ticks" });
        }

        for port in [self.app_port, self.lpp_port, self.class_switch_port] {
            if port == 0 || port > MAX_APP_PORT {
                return Err(NodeError::InvalidConfig { reason: "port outside 1..=223" });
            }
        }
        if self.app_port == self.class_switch_port
            || self.app_port == self.lpp_port
            || self.lpp_port == self.class_switch_port
        {
            return Err(NodeError::InvalidConfig { reason: "ports must be distinct" });
        }

        Ok(())
    }
}
