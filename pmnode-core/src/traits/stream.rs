//! Byte Stream Traits
//!
//! The console receive path follows a pull-based model using the `nb` crate:
//! the UART interrupt only pushes bytes into a bounded queue, and the main
//! loop pulls them out whenever it gets round to it. Nothing here blocks.
//!
//! ## Common Patterns
//!
//! ```rust
//! use pmnode_core::traits::ByteSource;
//!
//! fn drain<S: ByteSource>(source: &mut S) -> usize {
//!     let mut count = 0;
//!     loop {
//!         match source.poll_byte() {
//!             Ok(_) => count += 1,
//!             Err(nb::Error::WouldBlock) => return count,
//!             Err(nb::Error::Other(_)) => return count,
//!         }
//!     }
//! }
//!
//! let mut queue: heapless::spsc::Queue<u8, 8> = heapless::spsc::Queue::new();
//! let (mut producer, mut consumer) = queue.split();
//! producer.enqueue(b'o').unwrap();
//! producer.enqueue(b'k').unwrap();
//! assert_eq!(drain(&mut consumer), 2);
//! ```

use core::convert::Infallible;

use heapless::spsc::Consumer;

/// Non-blocking source of received bytes
///
/// ## Error Handling
///
/// - `nb::Error::WouldBlock` - Nothing received yet
/// - `nb::Error::Other(E)` - Receiver fault (framing, overrun)
///
/// Consumers treat `WouldBlock` as "done for this loop iteration".
pub trait ByteSource {
    /// Receiver fault type
    type Error;

    /// Pull the next received byte
    fn poll_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Whether a byte is waiting
    fn has_pending(&self) -> bool;

    /// Drop everything received so far
    fn discard_pending(&mut self) {
        while self.poll_byte().is_ok() {}
    }
}

impl<'q, const N: usize> ByteSource for Consumer<'q, u8, N> {
    type Error = Infallible;

    fn poll_byte(&mut self) -> nb::Result<u8, Self::Error> {
        self.dequeue().ok_or(nb::Error::WouldBlock)
    }

    fn has_pending(&self) -> bool {
        self.ready()
    }
}
