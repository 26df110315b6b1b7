//! Resource samplers for the @ys agent.
//!
//! Each [`Sampler`] keeps the counters it saw last so that it can report
//! rates (bytes per second, converted to megabytes) as well as instantaneous
//! percentages. Samplers are driven by the agent's tick loop: call
//! [`Sampler::start`] once, then [`Sampler::sample`] on every tick with the
//! seconds elapsed since the previous call.

pub mod bytes;
pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;

use anyhow::Result;
use ays_common::types::Measurement;

/// A stateful sampler of one system resource.
///
/// Samplers are not shared between threads; the agent owns them and calls
/// them one at a time.
pub trait Sampler: Send {
    /// Sampler name (e.g. `"cpu"`, `"disk"`), used for logging.
    fn name(&self) -> &str;

    /// Captures the baseline that the first [`sample`](Sampler::sample)
    /// call is measured against.
    ///
    /// # Errors
    ///
    /// Returns an error if the system counters cannot be read.
    fn start(&mut self) -> Result<()>;

    /// Returns the current measurements, computing rates over
    /// `elapsed_secs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the system counters cannot be read.
    fn sample(&mut self, elapsed_secs: f64) -> Result<Vec<Measurement>>;
}

/// Bytes per second between two cumulative counter readings.
///
/// A counter that went backwards (reset or wrap) counts as no traffic.
pub(crate) fn byte_rate(current: u64, previous: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    current.saturating_sub(previous) as f64 / elapsed_secs
}

#[cfg(test)]
mod tests {
    use super::byte_rate;

    #[test]
    fn byte_rate_over_elapsed_time() {
        assert_eq!(byte_rate(3_000, 1_000, 4.0), 500.0);
        assert_eq!(byte_rate(1_000, 3_000, 4.0), 0.0);
        assert_eq!(byte_rate(3_000, 1_000, 0.0), 0.0);
    }
}
