//! Setting-mode command dispatch
//!
//! | Command | Argument | Effect |
//! |---|---|---|
//! | `setcoef` | 30-200 | persist, then write to the sensor |
//! | `readcoef` | - | print the persisted coefficient |
//! | `watchpm` | - | print the cached PM2.5 reading |
//! | `measure` | - | run a full measurement and print PM2.5 |
//! | `check` | - | probe the sensor with a stop command |
//! | `exit` | - | leave setting mode |
//!
//! Replies go straight to the console. Only console write failures are
//! returned as errors; everything else is answered on the console and
//! logged.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;

use crate::cli::parse::ParsedCommand;
use crate::constants::console::{
    MSG_COMMAND_ERROR, MSG_MEASURE_START, MSG_SENSOR_CHECK_FAILED, MSG_SENSOR_ERROR,
    MSG_SENSOR_OK, MSG_SETTING_EXITED, MSG_SET_COEF_ARG_ERROR, MSG_SET_COEF_OK, PROMPT,
};
use crate::constants::protocol::{COEFFICIENT_MAX, COEFFICIENT_MIN};
use crate::errors::{NodeError, NodeResult};
use crate::sensor::HoneySensor;
use crate::storage::CoefficientStore;
use crate::traits::SensorPort;

/// Recognised console commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleCommand {
    /// `setcoef N`
    SetCoefficient(i32),
    /// `readcoef`
    ReadCoefficient,
    /// `watchpm`
    WatchPm,
    /// `measure`
    Measure,
    /// `check`
    Check,
    /// `exit`
    Exit,
    /// Blank line
    Empty,
    /// Anything else
    Unknown,
}

impl ConsoleCommand {
    /// Classify a tokenized line
    pub fn from_parsed(parsed: &ParsedCommand) -> Self {
        match parsed.name.as_slice() {
            b"setcoef" => ConsoleCommand::SetCoefficient(parsed.argument_value),
            b"readcoef" => ConsoleCommand::ReadCoefficient,
            b"watchpm" => ConsoleCommand::WatchPm,
            b"measure" => ConsoleCommand::Measure,
            b"check" => ConsoleCommand::Check,
            b"exit" => ConsoleCommand::Exit,
            _ => ConsoleCommand::Unknown,
        }
    }

    /// Tokenize and classify a raw line
    pub fn from_line(line: &[u8]) -> Self {
        if line.is_empty() {
            return ConsoleCommand::Empty;
        }
        Self::from_parsed(&ParsedCommand::parse(line))
    }
}

/// What the scheduler should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Stay in setting mode
    Continue,
    /// Return to telemetry
    ExitSettingMode,
}

/// Everything a command may touch
pub struct CommandContext<'a, P, S, D> {
    /// Sensor engine
    pub sensor: &'a mut HoneySensor<P>,
    /// Persistent coefficient
    pub store: &'a mut S,
    /// Blocking delay for the `measure` warmup
    pub delay: &'a mut D,
    /// Warmup before reading, in milliseconds
    pub warmup_ms: u32,
}

/// Range-check a console coefficient
pub fn validate_coefficient(value: i32) -> NodeResult<u8> {
    let min = i32::from(COEFFICIENT_MIN);
    let max = i32::from(COEFFICIENT_MAX);
    if (min..=max).contains(&value) {
        Ok(value as u8)
    } else {
        Err(NodeError::ArgumentOutOfRange { value, min, max })
    }
}

/// Run one command and write its reply
pub fn execute<P, S, D, W>(
    command: ConsoleCommand,
    ctx: &mut CommandContext<'_, P, S, D>,
    out: &mut W,
) -> NodeResult<Outcome>
where
    P: SensorPort,
    S: CoefficientStore,
    D: DelayNs,
    W: Write,
{
    node_debug!("console command {:?}", command);

    match command {
        ConsoleCommand::SetCoefficient(value) => match validate_coefficient(value) {
            Ok(coefficient) => {
                if ctx.store.store(coefficient).is_err() {
                    node_error!("coefficient {}: {}", coefficient, NodeError::Storage);
                }
                if let Err(err) = ctx.sensor.set_coefficient(coefficient) {
                    node_warn!("sensor rejected coefficient {}: {}", coefficient, err);
                }
                out.write_str(MSG_SET_COEF_OK)?;
            }
            Err(err) => {
                node_info!("setcoef rejected: {}", err);
                out.write_str(MSG_SET_COEF_ARG_ERROR)?;
            }
        },

        ConsoleCommand::ReadCoefficient => {
            let coefficient = ctx.store.load();
            write!(out, "\r\nCustomer Coefficient is {}\r\n", coefficient)?;
        }

        ConsoleCommand::WatchPm => {
            let pm2_5 = ctx.sensor.last_reading().reported_pm2_5();
            write!(out, "\r\nPM2.5 concentration is {} ug\r\n", pm2_5)?;
        }

        ConsoleCommand::Measure => {
            out.write_str(MSG_MEASURE_START)?;
            match ctx.sensor.measure(&mut *ctx.delay, ctx.warmup_ms) {
                Ok(reading) => write!(
                    out,
                    "\r\nMeasuring completed. PM2.5 is {} ug\r\n",
                    reading.reported_pm2_5()
                )?,
                Err(_) => out.write_str(MSG_SENSOR_ERROR)?,
            }
        }

        ConsoleCommand::Check => match ctx.sensor.stop() {
            Ok(()) => out.write_str(MSG_SENSOR_OK)?,
            Err(_) => out.write_str(MSG_SENSOR_CHECK_FAILED)?,
        },

        ConsoleCommand::Exit => {
            out.write_str(MSG_SETTING_EXITED)?;
            return Ok(Outcome::ExitSettingMode);
        }

        ConsoleCommand::Empty => out.write_str(PROMPT)?,

        ConsoleCommand::Unknown => out.write_str(MSG_COMMAND_ERROR)?,
    }

    Ok(Outcome::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify() {
        assert_eq!(ConsoleCommand::from_line(b""), ConsoleCommand::Empty);
        assert_eq!(ConsoleCommand::from_line(b"setcoef 150"), ConsoleCommand::SetCoefficient(150));
        assert_eq!(ConsoleCommand::from_line(b"readcoef"), ConsoleCommand::ReadCoefficient);
        assert_eq!(ConsoleCommand::from_line(b"watchpm"), ConsoleCommand::WatchPm);
        assert_eq!(ConsoleCommand::from_line(b"measure"), ConsoleCommand::Measure);
        assert_eq!(ConsoleCommand::from_line(b"check"), ConsoleCommand::Check);
        assert_eq!(ConsoleCommand::from_line(b"exit"), ConsoleCommand::Exit);
        assert_eq!(ConsoleCommand::from_line(b"EXIT"), ConsoleCommand::Unknown);
        assert_eq!(ConsoleCommand::from_line(b" exit"), ConsoleCommand::Unknown);
    }

    #[test]
    fn overlong_name_does_not_match() {
        // "readcoefx" survives truncation to 9 bytes and is not "readcoef"
        assert_eq!(ConsoleCommand::from_line(b"readcoefxyz"), ConsoleCommand::Unknown);
    }

    #[test]
    fn coefficient_bounds() {
        assert_eq!(validate_coefficient(30), Ok(30));
        assert_eq!(validate_coefficient(200), Ok(200));
        assert_eq!(
            validate_coefficient(29),
            Err(NodeError::ArgumentOutOfRange { value: 29, min: 30, max: 200 })
        );
        assert!(validate_coefficient(201).is_err());
        assert!(validate_coefficient(-150).is_err());
    }
}
