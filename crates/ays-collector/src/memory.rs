use crate::Sampler;
use anyhow::Result;
use ays_common::types::Measurement;
use sysinfo::System;

pub struct MemorySampler {
    system: System,
}

impl MemorySampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Share of memory in use, counting everything not available as used.
fn used_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (total.saturating_sub(available) as f64 / total as f64) * 100.0
}

impl Sampler for MemorySampler {
    fn name(&self) -> &str {
        "memory"
    }

    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn sample(&mut self, _elapsed_secs: f64) -> Result<Vec<Measurement>> {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        let available = self.system.available_memory();

        Ok(vec![Measurement::new(
            "ram_percent",
            used_percent(total, available),
        )])
    }
}
