//! Console adapter
//!
//! Joins the two halves of a console UART into one [`Console`]: received
//! bytes come from the consumer end of the interrupt-fed queue, replies go
//! to any `fmt::Write` sink (a blocking UART writer on the target, a string
//! on the host).
//!
//! [`Console`]: crate::traits::Console

use core::convert::Infallible;
use core::fmt;

use heapless::spsc::Consumer;

use crate::traits::ByteSource;

/// Console built from a receive queue and a text sink
pub struct QueuedConsole<'q, W, const N: usize> {
    rx: Consumer<'q, u8, N>,
    tx: W,
}

impl<'q, W: fmt::Write, const N: usize> QueuedConsole<'q, W, N> {
    /// Pair a queue consumer with a writer
    pub fn new(rx: Consumer<'q, u8, N>, tx: W) -> Self {
        Self { rx, tx }
    }

    /// Text sink
    pub fn writer(&self) -> &W {
        &self.tx
    }

    /// Text sink, mutable
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.tx
    }

    /// Split back into its halves
    pub fn into_parts(self) -> (Consumer<'q, u8, N>, W) {
        (self.rx, self.tx)
    }
}

impl<W: fmt::Write, const N: usize> fmt::Write for QueuedConsole<'_, W, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.tx.write_str(s)
    }
}

impl<W, const N: usize> ByteSource for QueuedConsole<'_, W, N> {
    type Error = Infallible;

    fn poll_byte(&mut self) -> nb::Result<u8, Self::Error> {
        self.rx.poll_byte()
    }

    fn has_pending(&self) -> bool {
        self.rx.has_pending()
    }
}
