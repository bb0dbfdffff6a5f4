//! Console line buffer
//!
//! Collects bytes until a carriage return. The buffer holds at most
//! [`LINE_CAPACITY`] bytes; the byte that arrives when it is already full
//! (terminator included) latches the overflow flag, and every byte after
//! that is rejected until [`LineBuffer::clear`].

use heapless::Vec;

use crate::constants::console::{BACKSPACE, LINE_CAPACITY, LINE_TERMINATOR};
use crate::errors::{NodeError, NodeResult};

/// Result of feeding one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineEvent {
    /// Byte appended; echo it
    Stored(u8),
    /// Last byte removed; echo a destructive backspace
    Erased,
    /// Byte had no effect (DEL on an empty line, input after a terminator)
    Ignored,
    /// Terminator seen; the line is ready
    Complete,
}

/// Fixed-capacity receive buffer for one command line
#[derive(Debug, Default)]
pub struct LineBuffer {
    bytes: Vec<u8, LINE_CAPACITY>,
    ready: bool,
    overflow: bool,
}

impl LineBuffer {
    /// Empty buffer
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            ready: false,
            overflow: false,
        }
    }

    /// Feed one received byte
    pub fn push(&mut self, byte: u8) -> NodeResult<LineEvent> {
        if self.overflow || self.bytes.is_full() {
            self.overflow = true;
            return Err(NodeError::BufferOverflow { capacity: LINE_CAPACITY });
        }

        if self.ready {
            return Ok(LineEvent::Ignored);
        }

        match byte {
            LINE_TERMINATOR => {
                self.ready = true;
                Ok(LineEvent::Complete)
            }
            BACKSPACE => match self.bytes.pop() {
                Some(_) => Ok(LineEvent::Erased),
                None => Ok(LineEvent::Ignored),
            },
            _ => {
                // Capacity was checked above
                let _ = self.bytes.push(byte);
                Ok(LineEvent::Stored(byte))
            }
        }
    }

    /// Completed line, without the terminator
    pub fn line(&self) -> Option<&[u8]> {
        self.ready.then_some(self.bytes.as_slice())
    }

    /// Bytes collected so far
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether a terminator has been received
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether the overflow flag is latched
    pub fn is_overflowed(&self) -> bool {
        self.overflow
    }

    /// Drop the content and both flags
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.ready = false;
        self.overflow = false;
    }
}
