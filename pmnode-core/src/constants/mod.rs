//! Constants for the Node Control Core
//!
//! Every wire value, timing interval and buffer size used by the node is
//! defined here, next to where it comes from. Values that a deployment may
//! reasonably tune (duty cycle, ports, thresholds) are also mirrored as
//! defaults in [`crate::config::NodeConfig`]; the rest are fixed by the
//! sensor datasheet or the console protocol.
//!
//! ## Organization
//!
//! - **Protocol**: Honeywell sensor frames, acknowledgements and limits
//! - **Timing**: Duty cycle, warmup and inactivity intervals
//! - **Console**: Line buffer sizes, control bytes and reply texts
//! - **Lorawan**: Ports, payload layout and battery scale

/// Honeywell particulate sensor wire protocol.
pub mod protocol;

/// Scheduling intervals and transaction timeouts.
pub mod timing;

/// Setting-mode console: buffer sizes, control characters and replies.
pub mod console;

/// LoRaWAN application ports, payload layout and battery scale.
pub mod lorawan;

// Re-export commonly used constants for convenience
pub use protocol::{
    FRAME_HEADER, COEFFICIENT_MIN, COEFFICIENT_MAX, COEFFICIENT_DEFAULT,
    PM_FAULT_SENTINEL, PM_SENTINEL_SUBSTITUTE,
};

pub use timing::{
    TX_DUTY_CYCLE_MS, SETTING_TICK_MS, SETTING_TIMEOUT_TICKS,
    SENSOR_WARMUP_MS, SENSOR_RESPONSE_TIMEOUT_MS,
};

pub use console::{LINE_CAPACITY, COMMAND_NAME_LEN, ARGUMENT_LEN, PROMPT};

pub use lorawan::{APP_PORT, CLASS_SWITCH_PORT, LPP_APP_PORT, PAYLOAD_CAPACITY};
