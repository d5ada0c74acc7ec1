//! Crate-internal log macros.
//!
//! Each macro forwards to `defmt` (firmware) and/or `tracing` (desktop)
//! depending on the enabled features. With neither feature enabled the
//! arguments are still type-checked through `format_args!` and nothing is
//! emitted. Format strings must stick to plain `{}` placeholders so they are
//! valid for both backends.

macro_rules! debug {
    ($($arg:tt)+) => {{
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)+);
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)+);
        #[cfg(not(any(feature = "defmt", feature = "tracing")))]
        let _ = format_args!($($arg)+);
    }};
}

macro_rules! trace {
    ($($arg:tt)+) => {{
        #[cfg(feature = "defmt")]
        defmt::trace!($($arg)+);
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)+);
        #[cfg(not(any(feature = "defmt", feature = "tracing")))]
        let _ = format_args!($($arg)+);
    }};
}

pub(crate) use debug;
pub(crate) use trace;
