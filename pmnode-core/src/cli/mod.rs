//! Setting-Mode Command Line
//!
//! - [`line`] - Byte-at-a-time line buffer with overflow latch
//! - [`parse`] - Tokenizer and the console integer routine
//! - [`interpreter`] - Command dispatch and console replies
//!
//! The scheduler owns the pieces and wires them to the console:
//!
//! ```text
//! RX byte → LineBuffer::push → echo
//!              │ Complete
//!              ↓
//!     ConsoleCommand::from_line → execute → reply
//! ```

pub mod interpreter;
pub mod line;
pub mod parse;

pub use interpreter::{execute, validate_coefficient, CommandContext, ConsoleCommand, Outcome};
pub use line::{LineBuffer, LineEvent};
pub use parse::{ascii_to_int, ParsedCommand};
