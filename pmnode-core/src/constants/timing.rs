//! Time-Related Constants
//!
//! Intervals driving the scheduler and the sensor transactions. The
//! scheduling values are defaults; deployments override them through
//! [`crate::config::NodeConfig`].

// ===== SCHEDULING =====

/// Interval between autonomous uplink attempts (milliseconds).
pub const TX_DUTY_CYCLE_MS: u32 = 60_000;

/// Granularity of the setting-mode inactivity timer (milliseconds).
pub const SETTING_TICK_MS: u32 = 5_000;

/// Inactivity ticks before setting mode gives up (25 × 5 s = 125 s).
pub const SETTING_TIMEOUT_TICKS: u8 = 25;

// ===== SENSOR =====

/// Fan spin-up time before a reading is meaningful (milliseconds).
pub const SENSOR_WARMUP_MS: u32 = 10_000;

/// Receive timeout for every sensor response (milliseconds).
pub const SENSOR_RESPONSE_TIMEOUT_MS: u32 = 100;

/// Transmit timeout for every sensor command (milliseconds).
pub const SENSOR_TRANSMIT_TIMEOUT_MS: u32 = 100;
