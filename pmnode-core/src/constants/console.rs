//! Setting Console Constants
//!
//! Buffer sizes, control characters and the fixed reply texts of the
//! setting-mode console. Replies keep the CRLF framing terminals expect.

// ===== BUFFERS =====

/// Console line buffer capacity (bytes, terminator excluded).
pub const LINE_CAPACITY: usize = 80;

/// Visible characters kept from the command name.
pub const COMMAND_NAME_LEN: usize = 9;

/// Visible characters kept from the argument.
pub const ARGUMENT_LEN: usize = 4;

// ===== CONTROL BYTES =====

/// Line terminator sent by the terminal.
pub const LINE_TERMINATOR: u8 = b'\r';

/// Backspace as sent by most terminals (DEL).
pub const BACKSPACE: u8 = 0x7F;

/// Token separator inside a command line.
pub const TOKEN_SEPARATOR: u8 = b' ';

/// Erases the last character on the terminal.
pub const BACKSPACE_ECHO: &str = "\x08 \x08";

// ===== REPLIES =====

/// Console prompt.
pub const PROMPT: &str = "\r\nchulanaruk > ";

/// Reply after a successful `setcoef`.
pub const MSG_SET_COEF_OK: &str = "\r\nSet Coef Success!\r\n";

/// Reply when the `setcoef` argument is out of range.
pub const MSG_SET_COEF_ARG_ERROR: &str = "\r\nSet Coef Argument Error!\r\n";

/// Announcement before the `measure` warmup.
pub const MSG_MEASURE_START: &str = "\r\nStarting sensor..., measuring...\r\n";

/// Reply when `measure` could not read the sensor.
pub const MSG_SENSOR_ERROR: &str = "Sensor Error!\r\n";

/// Reply when `check` got an acknowledgement.
pub const MSG_SENSOR_OK: &str = "\r\nSensor OK.\r\n";

/// Reply when `check` got no acknowledgement.
pub const MSG_SENSOR_CHECK_FAILED: &str = "\r\nSensor Error! Please Check Connection.\r\n";

/// Reply to `exit`.
pub const MSG_SETTING_EXITED: &str = "\r\nSetting Mode Exited.\r\n";

/// Notice when setting mode times out.
pub const MSG_SETTING_TIMEOUT: &str = "\r\nSETTING MODE TIMEOUT, entering normal mode...\r\n";

/// Reply to an unknown command.
pub const MSG_COMMAND_ERROR: &str = "\r\nCommand Error, Please retry.\r\n";

/// Reply when a line overflowed the buffer.
pub const MSG_BUFFER_OVERFLOW: &str = "Error! Buffer overflowed. Restarting buffer...";
