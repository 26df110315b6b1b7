use crate::Sampler;
use anyhow::Result;
use ays_common::types::Measurement;
use sysinfo::System;

pub struct CpuSampler {
    system: System,
    cores: usize,
}

impl CpuSampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            cores: 0,
        }
    }
}

impl Default for CpuSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for CpuSampler {
    fn name(&self) -> &str {
        "cpu"
    }

    fn start(&mut self) -> Result<()> {
        // usage is computed between refreshes; the first reading is meaningless
        self.system.refresh_cpu_all();
        self.cores = self.system.cpus().len();
        tracing::debug!(cores = self.cores, "CPU sampler started");
        Ok(())
    }

    fn sample(&mut self, _elapsed_secs: f64) -> Result<Vec<Measurement>> {
        self.system.refresh_cpu_all();
        if self.cores == 0 {
            self.cores = self.system.cpus().len();
        }
        let usage = f64::from(self.system.global_cpu_usage());

        Ok(vec![
            Measurement::new("cpu_cores", self.cores as f64),
            Measurement::new("cpu_usage", usage),
        ])
    }
}
