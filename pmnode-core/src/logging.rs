//! Logging facade
//!
//! Host builds (`std`) log through the `log` crate, firmware builds
//! (`embedded`) through `defmt`. With neither feature the macros expand to
//! nothing. Format strings must stay within the subset both backends accept:
//! plain `{}` and `{:?}` placeholders only.

#![allow(unused_macros)]

macro_rules! node_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        { log::debug!($($arg)*); }
        #[cfg(feature = "defmt")]
        { defmt::debug!($($arg)*); }
    }};
}

macro_rules! node_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        { log::info!($($arg)*); }
        #[cfg(feature = "defmt")]
        { defmt::info!($($arg)*); }
    }};
}

macro_rules! node_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        { log::warn!($($arg)*); }
        #[cfg(feature = "defmt")]
        { defmt::warn!($($arg)*); }
    }};
}

macro_rules! node_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log")]
        { log::error!($($arg)*); }
        #[cfg(feature = "defmt")]
        { defmt::error!($($arg)*); }
    }};
}
