//! Sources of values that are re-read on every tick.

use crate::DEFAULT_MONITOR_INTERVAL_SECS;
use anyhow::{bail, Context, Result};
use ays_collector::bytes::platform_byte_base;
use ays_collector::cpu::CpuSampler;
use ays_collector::disk::DiskSampler;
use ays_collector::memory::MemorySampler;
use ays_collector::network::NetworkSampler;
use ays_collector::Sampler;
use ays_common::types::{Measurement, MonitorResource};
use ays_payload::align::align;
use ays_payload::Options;
use std::path::PathBuf;
use std::time::Duration;

pub enum ValueSource {
    /// System resource samplers, reported together as `values`.
    Resources(Vec<Box<dyn Sampler>>),
    /// A shell command whose output is a comma-separated value list. It is
    /// killed when it runs longer than `timeout`.
    Program { command: String, timeout: Duration },
    /// A CSV file whose last line is the value list.
    File(PathBuf),
}

impl ValueSource {
    /// Picks the configured monitor, preferring resources, then a program,
    /// then a file. `Ok(None)` when no monitor is configured.
    pub fn from_options(options: &Options) -> ays_common::error::Result<Option<Self>> {
        if let Some(raw) = options.monitor_resources.as_deref().filter(|r| !r.is_empty()) {
            let base = options.byte_base.unwrap_or_else(platform_byte_base);
            let samplers = MonitorResource::parse_list(raw)?
                .into_iter()
                .map(|resource| sampler_for(resource, base))
                .collect();
            return Ok(Some(Self::Resources(samplers)));
        }
        if let Some(program) = options.monitor_program.as_deref().filter(|p| !p.is_empty()) {
            let timeout = options.interval.unwrap_or(DEFAULT_MONITOR_INTERVAL_SECS);
            return Ok(Some(Self::Program {
                command: program.to_string(),
                timeout: Duration::from_secs(timeout),
            }));
        }
        if let Some(path) = options
            .monitor_file
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
        {
            return Ok(Some(Self::File(path.clone())));
        }
        Ok(None)
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Resources(samplers) => {
                let names: Vec<&str> = samplers.iter().map(|s| s.name()).collect();
                format!("resources ({})", names.join(", "))
            }
            Self::Program { command, .. } => format!("program ({command})"),
            Self::File(path) => format!("file ({})", path.display()),
        }
    }

    /// Captures sampler baselines. Samplers that cannot start are dropped.
    pub fn start(&mut self) {
        if let Self::Resources(samplers) = self {
            samplers.retain_mut(|sampler| match sampler.start() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(sampler = sampler.name(), error = %e, "Sampler unavailable, skipping");
                    false
                }
            });
        }
    }

    /// Reads the current values. `elapsed_secs` is the time since the
    /// previous read and only matters for rate samplers.
    pub async fn read(&mut self, options: &Options, elapsed_secs: f64) -> Result<Vec<Measurement>> {
        match self {
            Self::Resources(samplers) => {
                let mut points = Vec::new();
                for sampler in samplers.iter_mut() {
                    match sampler.sample(elapsed_secs) {
                        Ok(sampled) => points.extend(sampled),
                        Err(e) => {
                            tracing::warn!(sampler = sampler.name(), error = %e, "Sampling failed")
                        }
                    }
                }
                if points.is_empty() {
                    bail!("no resource could be sampled");
                }
                tracing::debug!(count = points.len(), "Sampled resources");
                Ok(points)
            }
            Self::Program { command, timeout } => {
                let output = run_program(command, *timeout).await?;
                Ok(align_output(output.trim(), options)?)
            }
            Self::File(path) => {
                let content = tokio::fs::read_to_string(&*path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let line = last_line(&content)
                    .with_context(|| format!("{} has no values", path.display()))?;
                Ok(align_output(line, options)?)
            }
        }
    }
}

fn sampler_for(resource: MonitorResource, base: u64) -> Box<dyn Sampler> {
    match resource {
        MonitorResource::Cpu => Box::new(CpuSampler::new()),
        MonitorResource::Ram => Box::new(MemorySampler::new()),
        MonitorResource::Hdd => Box::new(DiskSampler::new(None).with_base(base)),
        MonitorResource::Net => Box::new(NetworkSampler::new().with_base(base)),
    }
}

fn align_output(raw: &str, options: &Options) -> ays_common::error::Result<Vec<Measurement>> {
    align(
        raw,
        options.value_names.as_deref(),
        options.value_thresholds.as_deref(),
    )
}

fn last_line(content: &str) -> Option<&str> {
    content.lines().map(str::trim).rfind(|line| !line.is_empty())
}

async fn run_program(program: &str, timeout: Duration) -> Result<String> {
    let mut command = if cfg!(windows) {
        let mut c = tokio::process::Command::new("cmd");
        c.arg("/C");
        c
    } else {
        let mut c = tokio::process::Command::new("sh");
        c.arg("-c");
        c
    };
    command.arg(program).kill_on_drop(true);

    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| anyhow::anyhow!("{program} did not finish within {}s", timeout.as_secs_f64()))?
        .with_context(|| format!("failed to run {program}"))?;

    if !output.status.success() {
        bail!(
            "{program} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resources_take_precedence() {
        let options = Options {
            monitor_resources: Some("ram,cpu".into()),
            monitor_program: Some("echo 1".into()),
            ..Options::default()
        };
        let source = ValueSource::from_options(&options).unwrap().unwrap();
        assert_eq!(source.describe(), "resources (cpu, memory)");

        let options = Options {
            monitor_program: Some("echo 1".into()),
            monitor_file: Some("values.csv".into()),
            ..Options::default()
        };
        let source = ValueSource::from_options(&options).unwrap().unwrap();
        assert!(matches!(source, ValueSource::Program { .. }));
    }

    #[test]
    fn program_timeout_follows_interval() {
        let options = Options {
            monitor_program: Some("echo 1".into()),
            ..Options::default()
        };
        let Some(ValueSource::Program { timeout, .. }) = ValueSource::from_options(&options).unwrap()
        else {
            panic!("expected a program source");
        };
        assert_eq!(timeout, Duration::from_secs(DEFAULT_MONITOR_INTERVAL_SECS));

        let options = Options {
            interval: Some(60),
            ..options
        };
        let Some(ValueSource::Program { timeout, .. }) = ValueSource::from_options(&options).unwrap()
        else {
            panic!("expected a program source");
        };
        assert_eq!(timeout, Duration::from_secs(60));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hanging_program_times_out() {
        let mut source = ValueSource::Program {
            command: "sleep 30".into(),
            timeout: Duration::from_millis(200),
        };
        let started = std::time::Instant::now();
        let err = source.read(&Options::default(), 0.0).await.unwrap_err();
        assert!(err.to_string().contains("did not finish"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn no_monitor_configured() {
        assert!(ValueSource::from_options(&Options::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn unknown_resource_is_rejected() {
        let options = Options {
            monitor_resources: Some("cpu,gpu".into()),
            ..Options::default()
        };
        assert!(ValueSource::from_options(&options).is_err());
    }

    #[test]
    fn last_non_empty_line() {
        assert_eq!(last_line("1,2\n3,4\n\n"), Some("3,4"));
        assert_eq!(last_line("\n  \n"), None);
    }
}
