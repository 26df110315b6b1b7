use crate::bytes::{format_bytes, platform_byte_base, to_megabytes};
use crate::{byte_rate, Sampler};
use anyhow::Result;
use ays_common::types::Measurement;
use sysinfo::Networks;

/// Source of cumulative network traffic counters.
pub trait NetworkCounters: Send {
    /// Cumulative `(bytes_sent, bytes_received)` across all interfaces.
    fn io_bytes(&mut self) -> Result<(u64, u64)>;
}

pub struct SystemNetwork {
    networks: Networks,
}

impl SystemNetwork {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SystemNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkCounters for SystemNetwork {
    fn io_bytes(&mut self) -> Result<(u64, u64)> {
        self.networks.refresh();
        Ok(self
            .networks
            .iter()
            .fold((0u64, 0u64), |(sent, received), (_, data)| {
                (
                    sent.saturating_add(data.total_transmitted()),
                    received.saturating_add(data.total_received()),
                )
            }))
    }
}

/// Reports upload and download rates since the previous sample.
pub struct NetworkSampler<C = SystemNetwork> {
    counters: C,
    base: u64,
    bytes_sent: u64,
    bytes_received: u64,
}

impl NetworkSampler<SystemNetwork> {
    pub fn new() -> Self {
        Self::with_counters(SystemNetwork::new())
    }
}

impl Default for NetworkSampler<SystemNetwork> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NetworkCounters> NetworkSampler<C> {
    pub fn with_counters(counters: C) -> Self {
        Self {
            counters,
            base: platform_byte_base(),
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    pub fn with_base(mut self, base: u64) -> Self {
        self.base = base;
        self
    }
}

impl<C: NetworkCounters> Sampler for NetworkSampler<C> {
    fn name(&self) -> &str {
        "network"
    }

    fn start(&mut self) -> Result<()> {
        let (sent, received) = self.counters.io_bytes()?;
        self.bytes_sent = sent;
        self.bytes_received = received;
        tracing::debug!(
            sent = %format_bytes(sent as f64, self.base),
            received = %format_bytes(received as f64, self.base),
            "Network sampler started"
        );
        Ok(())
    }

    fn sample(&mut self, elapsed_secs: f64) -> Result<Vec<Measurement>> {
        let (sent, received) = self.counters.io_bytes()?;

        let upload = byte_rate(sent, self.bytes_sent, elapsed_secs);
        let download = byte_rate(received, self.bytes_received, elapsed_secs);
        self.bytes_sent = sent;
        self.bytes_received = received;

        tracing::debug!(
            up = %format_bytes(upload, self.base),
            down = %format_bytes(download, self.base),
            "Network traffic per second"
        );

        Ok(vec![
            Measurement::new("net_upload_rate_mb", to_megabytes(upload, self.base)),
            Measurement::new("net_download_rate_mb", to_megabytes(download, self.base)),
        ])
    }
}
