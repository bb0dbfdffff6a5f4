//! Command line tokenizer and integer routine
//!
//! A line is `NAME[ ARG[ ...]]`. Only the first two space-separated tokens
//! are used; the name keeps at most [`COMMAND_NAME_LEN`] bytes and the
//! argument at most [`ARGUMENT_LEN`].

use heapless::Vec;

use crate::constants::console::{ARGUMENT_LEN, COMMAND_NAME_LEN, TOKEN_SEPARATOR};

/// Tokenized command line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCommand {
    /// Command name, truncated
    pub name: Vec<u8, COMMAND_NAME_LEN>,
    /// Argument text, truncated
    pub argument_text: Vec<u8, ARGUMENT_LEN>,
    /// Argument converted by [`ascii_to_int`]
    pub argument_value: i32,
}

impl ParsedCommand {
    /// Split a line into name and argument
    pub fn parse(line: &[u8]) -> Self {
        let mut tokens = line.split(|byte| *byte == TOKEN_SEPARATOR);
        let name_token = tokens.next().unwrap_or_default();
        let argument_token = tokens.next().unwrap_or_default();

        let name = truncated(name_token);
        let argument_text = truncated(argument_token);
        let argument_value = ascii_to_int(&argument_text);

        Self {
            name,
            argument_text,
            argument_value,
        }
    }

    /// Command name as text; empty if it is not valid UTF-8
    pub fn name_str(&self) -> &str {
        core::str::from_utf8(&self.name).unwrap_or("")
    }
}

fn truncated<const N: usize>(token: &[u8]) -> Vec<u8, N> {
    let keep = token.len().min(N);
    let mut out = Vec::new();
    // keep <= N
    let _ = out.extend_from_slice(&token[..keep]);
    out
}

/// Positional decimal conversion used by the console
///
/// An optional leading `-` negates. Every remaining byte contributes
/// `(byte - '0') * 10^k`, with `k` counting down from the number of digits.
/// Non-digit bytes are not rejected and produce an arbitrary but
/// deterministic value. Empty input and a lone `-` give 0.
///
/// ```rust
/// use pmnode_core::cli::ascii_to_int;
///
/// assert_eq!(ascii_to_int(b"150"), 150);
/// assert_eq!(ascii_to_int(b"-42"), -42);
/// assert_eq!(ascii_to_int(b""), 0);
/// ```
pub fn ascii_to_int(text: &[u8]) -> i32 {
    let (negative, digits) = match text.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, text),
    };

    let mut magnitude: u32 = 1;
    for _ in 1..digits.len() {
        magnitude = magnitude.wrapping_mul(10);
    }

    let mut result: i32 = 0;
    for byte in digits {
        let digit = i32::from(*byte) - i32::from(b'0');
        result = result.wrapping_add(magnitude.wrapping_mul(digit as u32) as i32);
        magnitude /= 10;
    }

    if negative {
        result.wrapping_neg()
    } else {
        result
    }
}
