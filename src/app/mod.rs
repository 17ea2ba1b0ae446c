//! Binary-side application wiring: config file, progress UI, run loop.

pub(crate) mod config;
pub(crate) mod progress;
pub(crate) mod runtime;
