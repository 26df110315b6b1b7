//! The @ys agent: merges options, samples values, compiles the payload and
//! posts it to the agent endpoint, once or on an interval.

pub mod cli;
pub mod config;
pub mod monitor;
pub mod service;
pub mod transport;

/// Port of the local test endpoint while running as a service.
pub const DEFAULT_PORT: u16 = 9555;

/// Reporting interval used when a monitor is configured without one.
pub const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 300;
