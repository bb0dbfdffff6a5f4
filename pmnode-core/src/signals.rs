//! Interrupt-to-Main-Loop Signalling
//!
//! ## Overview
//!
//! Interrupt handlers never call into the control core. They raise a flag
//! here (timers, button, LoRaWAN stack) or push a byte into the console
//! queue, and the main loop picks the work up on its next iteration:
//!
//! ```text
//! Producers (ISR)                         Consumer (main loop)
//!   tx timer ────┐
//!   tick timer ──┤  raise()   ┌─────────┐  take()
//!   button ──────┼──────────→ │ Signals │ ────────→ Node::poll()
//!   radio IRQ ───┘            └─────────┘
//!   console RX ──── enqueue ─→ spsc::Queue<u8> ──→ LineBuffer
//! ```
//!
//! ## Why Load/Store Only?
//!
//! Cortex-M0+ has no compare-and-swap. Each signal is its own `AtomicBool`,
//! so raising is a single store and taking is a load followed by a store on
//! the consumer side. The consumer is the only writer of `false`, which
//! makes the split read-modify-write safe without CAS.
//!
//! A signal raised twice before it is taken is seen once. That is the
//! intended behaviour for periodic timers: a missed period is skipped, not
//! queued.
//!
//! ## Memory Ordering
//!
//! - **Release** on raise: data an ISR prepared before raising is visible
//! - **Acquire** on take: the main loop sees that data after observing the flag

use core::sync::atomic::{AtomicBool, Ordering};

/// Sources of main-loop work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Signal {
    /// Periodic uplink timer expired
    TxTimer,
    /// Setting-mode inactivity tick
    SettingTick,
    /// Setting-mode button pressed
    Button,
    /// LoRaWAN stack needs `process()`
    MacProcess,
}

impl Signal {
    /// Every signal, in service order
    pub const ALL: [Signal; 4] = [
        Signal::MacProcess,
        Signal::Button,
        Signal::SettingTick,
        Signal::TxTimer,
    ];
}

/// Flag set shared between interrupt handlers and the main loop
///
/// Lives in a `static`; every method takes `&self`.
///
/// ```rust
/// use pmnode_core::signals::{Signal, Signals};
///
/// static SIGNALS: Signals = Signals::new();
///
/// // timer interrupt
/// SIGNALS.raise(Signal::TxTimer);
/// SIGNALS.raise(Signal::TxTimer);
///
/// // main loop
/// assert!(SIGNALS.take(Signal::TxTimer));
/// assert!(!SIGNALS.take(Signal::TxTimer));
/// ```
#[derive(Debug)]
pub struct Signals {
    tx_timer: AtomicBool,
    setting_tick: AtomicBool,
    button: AtomicBool,
    mac_process: AtomicBool,
}

impl Signals {
    /// All flags clear
    pub const fn new() -> Self {
        Self {
            tx_timer: AtomicBool::new(false),
            setting_tick: AtomicBool::new(false),
            button: AtomicBool::new(false),
            mac_process: AtomicBool::new(false),
        }
    }

    fn flag(&self, signal: Signal) -> &AtomicBool {
        match signal {
            Signal::TxTimer => &self.tx_timer,
            Signal::SettingTick => &self.setting_tick,
            Signal::Button => &self.button,
            Signal::MacProcess => &self.mac_process,
        }
    }

    /// Mark work as pending. Safe from interrupt context.
    #[inline]
    pub fn raise(&self, signal: Signal) {
        self.flag(signal).store(true, Ordering::Release);
    }

    /// Consume a pending signal, returning whether it was set
    ///
    /// Main loop only.
    #[inline]
    pub fn take(&self, signal: Signal) -> bool {
        let flag = self.flag(signal);
        if flag.load(Ordering::Acquire) {
            flag.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Check a signal without consuming it
    #[inline]
    pub fn is_pending(&self, signal: Signal) -> bool {
        self.flag(signal).load(Ordering::Acquire)
    }

    /// Drop a pending signal without acting on it
    #[inline]
    pub fn clear(&self, signal: Signal) {
        self.flag(signal).store(false, Ordering::Release);
    }

    /// Whether any signal is pending
    pub fn any_pending(&self) -> bool {
        Signal::ALL.iter().any(|signal| self.is_pending(*signal))
    }
}

impl Default for Signals {
    fn default() -> Self {
        Self::new()
    }
}
