//! Persistent calibration coefficient
//!
//! The node keeps exactly one byte across power cycles: the customer
//! coefficient entered with `setcoef`. On the target this is an EEPROM or
//! flash cell; [`RamStore`] backs host builds and tests.

use crate::constants::protocol::COEFFICIENT_DEFAULT;

/// Non-volatile storage of the calibration coefficient
pub trait CoefficientStore {
    /// Write failure
    type Error: core::fmt::Debug;

    /// Last stored value
    ///
    /// A blank cell reads back as whatever the medium holds; callers that
    /// care should range-check.
    fn load(&mut self) -> u8;

    /// Persist a new value
    fn store(&mut self, value: u8) -> Result<(), Self::Error>;
}

/// Volatile in-memory store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamStore {
    value: u8,
    writes: u32,
}

impl RamStore {
    /// Store holding `value`
    pub const fn new(value: u8) -> Self {
        Self { value, writes: 0 }
    }

    /// Current value
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Number of successful `store` calls, for wear accounting
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl Default for RamStore {
    fn default() -> Self {
        Self::new(COEFFICIENT_DEFAULT)
    }
}

impl CoefficientStore for RamStore {
    type Error = core::convert::Infallible;

    fn load(&mut self) -> u8 {
        self.value
    }

    fn store(&mut self, value: u8) -> Result<(), Self::Error> {
        self.value = value;
        self.writes = self.writes.saturating_add(1);
        Ok(())
    }
}
