use crate::bytes::{format_bytes, platform_byte_base, to_megabytes};
use crate::{byte_rate, Sampler};
use anyhow::{anyhow, Result};
use ays_common::types::Measurement;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

/// Sector size used by `/proc/diskstats`, independent of the device.
const SECTOR_SIZE: u64 = 512;

/// Source of disk space and cumulative I/O counters.
pub trait DiskCounters: Send {
    /// Percentage of the monitored filesystem in use.
    fn used_percent(&mut self) -> Result<f64>;

    /// Cumulative `(bytes_read, bytes_written)` across physical disks.
    fn io_bytes(&mut self) -> Result<(u64, u64)>;
}

/// Reads the host's disks through `sysinfo` and the kernel I/O counters.
pub struct SystemDisk {
    disks: Disks,
    mount: PathBuf,
}

impl SystemDisk {
    pub fn new(mount: impl Into<PathBuf>) -> Self {
        Self {
            disks: Disks::new_with_refreshed_list(),
            mount: mount.into(),
        }
    }
}

impl DiskCounters for SystemDisk {
    fn used_percent(&mut self) -> Result<f64> {
        self.disks.refresh();
        let disk = self
            .disks
            .iter()
            .find(|d| d.mount_point() == self.mount.as_path())
            .ok_or_else(|| anyhow!("no disk mounted at {}", self.mount.display()))?;

        let total = disk.total_space();
        let used = total.saturating_sub(disk.available_space());
        Ok(if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        })
    }

    #[cfg(target_os = "linux")]
    fn io_bytes(&mut self) -> Result<(u64, u64)> {
        let content = std::fs::read_to_string("/proc/diskstats")?;
        Ok(parse_diskstats(&content))
    }

    #[cfg(not(target_os = "linux"))]
    fn io_bytes(&mut self) -> Result<(u64, u64)> {
        Err(anyhow!("disk I/O counters are not supported on this platform"))
    }
}

/// Sums bytes read and written over whole disks in `/proc/diskstats`.
///
/// Partitions, loop, ram and device-mapper entries are skipped so that no
/// I/O is counted twice.
pub fn parse_diskstats(content: &str) -> (u64, u64) {
    let mut read = 0u64;
    let mut written = 0u64;
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        if !is_whole_disk(fields[2]) {
            continue;
        }
        let sectors_read: u64 = fields[5].parse().unwrap_or(0);
        let sectors_written: u64 = fields[9].parse().unwrap_or(0);
        read = read.saturating_add(sectors_read * SECTOR_SIZE);
        written = written.saturating_add(sectors_written * SECTOR_SIZE);
    }
    (read, written)
}

fn is_whole_disk(device: &str) -> bool {
    if ["loop", "ram", "zram", "dm-", "md"]
        .iter()
        .any(|prefix| device.starts_with(prefix))
    {
        return false;
    }
    if device.starts_with("nvme") || device.starts_with("mmcblk") {
        // nvme0n1 / mmcblk0 are disks, nvme0n1p1 / mmcblk0p1 are partitions
        return !device.rsplit_once('p').is_some_and(|(head, tail)| {
            head.ends_with(|c: char| c.is_ascii_digit())
                && !tail.is_empty()
                && tail.chars().all(|c| c.is_ascii_digit())
        });
    }
    !device.ends_with(|c: char| c.is_ascii_digit())
}

fn default_mount() -> &'static Path {
    if cfg!(windows) {
        Path::new("C:\\")
    } else {
        Path::new("/")
    }
}

/// Reports disk usage plus read and write rates since the previous sample.
///
/// Where the I/O counters cannot be read only the usage is reported.
pub struct DiskSampler<C = SystemDisk> {
    counters: C,
    base: u64,
    io_available: bool,
    bytes_read: u64,
    bytes_written: u64,
}

impl DiskSampler<SystemDisk> {
    /// Samples the filesystem mounted at `mount`, or the root filesystem.
    pub fn new(mount: Option<&Path>) -> Self {
        Self::with_counters(SystemDisk::new(mount.unwrap_or(default_mount())))
    }
}

impl<C: DiskCounters> DiskSampler<C> {
    pub fn with_counters(counters: C) -> Self {
        Self {
            counters,
            base: platform_byte_base(),
            io_available: false,
            bytes_read: 0,
            bytes_written: 0,
        }
    }

    pub fn with_base(mut self, base: u64) -> Self {
        self.base = base;
        self
    }
}

impl<C: DiskCounters> Sampler for DiskSampler<C> {
    fn name(&self) -> &str {
        "disk"
    }

    fn start(&mut self) -> Result<()> {
        match self.counters.io_bytes() {
            Ok((read, written)) => {
                self.io_available = true;
                self.bytes_read = read;
                self.bytes_written = written;
                tracing::debug!(
                    read = %format_bytes(read as f64, self.base),
                    written = %format_bytes(written as f64, self.base),
                    "Disk sampler started"
                );
            }
            Err(e) => {
                self.io_available = false;
                tracing::warn!(error = %e, "Disk I/O counters unavailable, reporting usage only");
            }
        }
        Ok(())
    }

    fn sample(&mut self, elapsed_secs: f64) -> Result<Vec<Measurement>> {
        let used_percent = self.counters.used_percent()?;
        if !self.io_available {
            return Ok(vec![Measurement::new("disk_used_percent", used_percent)]);
        }
        let (read, written) = self.counters.io_bytes()?;

        let read_rate = byte_rate(read, self.bytes_read, elapsed_secs);
        let write_rate = byte_rate(written, self.bytes_written, elapsed_secs);
        self.bytes_read = read;
        self.bytes_written = written;

        tracing::debug!(
            read = %format_bytes(read_rate, self.base),
            write = %format_bytes(write_rate, self.base),
            "Disk I/O per second"
        );

        Ok(vec![
            Measurement::new("disk_used_percent", used_percent),
            Measurement::new("disk_read_rate_mb", to_megabytes(read_rate, self.base)),
            Measurement::new("disk_write_rate_mb", to_megabytes(write_rate, self.base)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct FakeDisk {
        readings: VecDeque<(u64, u64)>,
    }

    impl DiskCounters for FakeDisk {
        fn used_percent(&mut self) -> Result<f64> {
            Ok(42.0)
        }

        fn io_bytes(&mut self) -> Result<(u64, u64)> {
            self.readings
                .pop_front()
                .ok_or_else(|| anyhow!("no more readings"))
        }
    }

    const MB: u64 = 1024 * 1024;

    #[test]
    fn rates_are_deltas_over_elapsed_seconds() {
        let mut sampler = DiskSampler::with_counters(FakeDisk {
            readings: VecDeque::from([
                (10 * MB, 100 * MB),
                (30 * MB, 110 * MB),
                (30 * MB, 150 * MB),
            ]),
        })
        .with_base(1024);
        sampler.start().unwrap();

        let first = sampler.sample(10.0).unwrap();
        assert_eq!(
            first,
            vec![
                Measurement::new("disk_used_percent", 42.0),
                Measurement::new("disk_read_rate_mb", 2.0),
                Measurement::new("disk_write_rate_mb", 1.0),
            ]
        );

        // the previous reading becomes the new baseline
        let second = sampler.sample(20.0).unwrap();
        assert_eq!(second[1].value, 0.0);
        assert_eq!(second[2].value, 2.0);
    }

    #[test]
    fn base_1000_changes_megabytes() {
        let mut sampler = DiskSampler::with_counters(FakeDisk {
            readings: VecDeque::from([(0, 0), (4_000_000, 0)]),
        })
        .with_base(1000);
        sampler.start().unwrap();
        let points = sampler.sample(2.0).unwrap();
        assert_eq!(points[1].value, 2.0);
    }

    #[test]
    fn usage_is_reported_without_io_counters() {
        let mut sampler = DiskSampler::with_counters(FakeDisk {
            readings: VecDeque::new(),
        });
        sampler.start().unwrap();
        let points = sampler.sample(15.0).unwrap();
        assert_eq!(points, vec![Measurement::new("disk_used_percent", 42.0)]);
    }

    #[test]
    fn io_errors_after_start_propagate() {
        let mut sampler = DiskSampler::with_counters(FakeDisk {
            readings: VecDeque::from([(0, 0)]),
        });
        sampler.start().unwrap();
        assert!(sampler.sample(15.0).is_err());
    }

    #[test]
    fn root_filesystem_by_default() {
        let sampler = DiskSampler::new(None);
        assert_eq!(sampler.counters.mount, default_mount());
        let custom = DiskSampler::new(Some(Path::new("/data")));
        assert_eq!(custom.counters.mount, Path::new("/data"));
    }

    #[test]
    fn diskstats_counts_whole_disks_only() {
        let content = "\
   8       0 sda 100 0 2048 0 50 0 4096 0 0 0 0
   8       1 sda1 90 0 2000 0 40 0 4000 0 0 0 0
 259       0 nvme0n1 10 0 10 0 10 0 20 0 0 0 0
 259       1 nvme0n1p1 10 0 10 0 10 0 20 0 0 0 0
   7       0 loop0 5 0 999 0 0 0 0 0 0 0 0
 253       0 dm-0 5 0 999 0 0 0 999 0 0 0 0
";
        let (read, written) = parse_diskstats(content);
        assert_eq!(read, (2048 + 10) * SECTOR_SIZE);
        assert_eq!(written, (4096 + 20) * SECTOR_SIZE);
    }

    #[test]
    fn whole_disk_names() {
        assert!(is_whole_disk("sda"));
        assert!(is_whole_disk("vdb"));
        assert!(is_whole_disk("nvme0n1"));
        assert!(is_whole_disk("mmcblk0"));
        assert!(!is_whole_disk("sda2"));
        assert!(!is_whole_disk("nvme0n1p3"));
        assert!(!is_whole_disk("mmcblk0p1"));
        assert!(!is_whole_disk("loop3"));
    }
}
