//! Byte unit helpers.
//!
//! macOS tools (Activity Monitor, `df -H`) count in powers of 1000; other
//! platforms use 1024. Samplers default to [`platform_byte_base`] and accept
//! an override.

const UNITS: [&str; 6] = ["", "K", "M", "G", "T", "P"];

pub fn platform_byte_base() -> u64 {
    if cfg!(target_os = "macos") {
        1000
    } else {
        1024
    }
}

pub fn to_megabytes(bytes: f64, base: u64) -> f64 {
    let base = base as f64;
    bytes / (base * base)
}

/// Formats a byte count such as `1536.0` as `"1.50KB"` (base 1024).
pub fn format_bytes(bytes: f64, base: u64) -> String {
    let base = base as f64;
    let mut value = bytes;
    for unit in &UNITS[..UNITS.len() - 1] {
        if value < base {
            return format!("{value:.2}{unit}B");
        }
        value /= base;
    }
    format!("{value:.2}{}B", UNITS[UNITS.len() - 1])
}
