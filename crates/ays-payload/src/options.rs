//! Agent options and the merge of persisted defaults with per-run overrides.
//!
//! Merging is override-wins-if-truthy: an override replaces the persisted
//! value only when it is present and not empty, zero or `false`. A known
//! limitation follows from this: an override cannot clear a persisted value,
//! e.g. `managed = true` in the config file cannot be turned back to `false`
//! from the command line. Edit or rewrite the config file instead.

use ays_common::error::{AgentError, Result};
use ays_common::types::MIN_INTERVAL_SECS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Every option the agent recognises.
///
/// Required strings default to empty; everything else is absent until set.
/// Absent fields are never written back to the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub org_secret: String,
    pub server: String,
    pub parent: String,
    pub monitor_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    /// Port of the local test endpoint while running as a service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_child: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_threshold: Option<String>,
    /// Comma-separated values, e.g. `"4.1,5.0,7.7"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_names: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_thresholds: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_state: Option<String>,
    /// Comma-separated resource selectors (`all`, `cpu`, `hdd`, `ram`, `net`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_resources: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_program: Option<String>,
    /// Overrides the platform byte divisor used for rates (1000 or 1024).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_base: Option<u64>,
}

impl Options {
    /// Loads persisted options. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let options: Self = toml::from_str(&content)?;
                tracing::debug!(path = %path.display(), "Loaded agent options");
                Ok(options)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::info!(path = %path.display(), "Saved agent options");
        Ok(())
    }

    /// Checks constraints that apply regardless of what is being reported.
    pub fn validate(&self) -> Result<()> {
        if let Some(interval) = self.interval {
            if interval < MIN_INTERVAL_SECS {
                return Err(AgentError::IntervalTooShort(interval));
            }
        }
        if let Some(base) = self.byte_base {
            if base != 1000 && base != 1024 {
                return Err(AgentError::InvalidByteBase(base));
            }
        }
        Ok(())
    }

    /// True when any monitor (resources, program or file) is configured.
    pub fn has_monitor(&self) -> bool {
        self.monitor_resources.is_truthy()
            || self.monitor_program.is_truthy()
            || self.monitor_file.is_truthy()
    }
}

/// Merges `overrides` onto `base`, field by field.
///
/// # Errors
///
/// [`AgentError::IntervalTooShort`] or [`AgentError::InvalidByteBase`] if
/// the merged options break those constraints.
pub fn merge(base: &Options, overrides: &Options) -> Result<Options> {
    let merged = Options {
        org_secret: pick(&base.org_secret, &overrides.org_secret),
        server: pick(&base.server, &overrides.server),
        parent: pick(&base.parent, &overrides.parent),
        monitor_name: pick(&base.monitor_name, &overrides.monitor_name),
        interval: pick(&base.interval, &overrides.interval),
        port: pick(&base.port, &overrides.port),
        child: pick(&base.child, &overrides.child),
        create_child: pick(&base.create_child, &overrides.create_child),
        node_type: pick(&base.node_type, &overrides.node_type),
        managed: pick(&base.managed, &overrides.managed),
        heartbeat_timeout: pick(&base.heartbeat_timeout, &overrides.heartbeat_timeout),
        heartbeat_level: pick(&base.heartbeat_level, &overrides.heartbeat_level),
        value: pick(&base.value, &overrides.value),
        value_name: pick(&base.value_name, &overrides.value_name),
        value_threshold: pick(&base.value_threshold, &overrides.value_threshold),
        values: pick(&base.values, &overrides.values),
        value_names: pick(&base.value_names, &overrides.value_names),
        value_thresholds: pick(&base.value_thresholds, &overrides.value_thresholds),
        status_message: pick(&base.status_message, &overrides.status_message),
        status_state: pick(&base.status_state, &overrides.status_state),
        monitor_resources: pick(&base.monitor_resources, &overrides.monitor_resources),
        monitor_file: pick(&base.monitor_file, &overrides.monitor_file),
        monitor_program: pick(&base.monitor_program, &overrides.monitor_program),
        byte_base: pick(&base.byte_base, &overrides.byte_base),
    };
    merged.validate()?;
    Ok(merged)
}

fn pick<T: Truthy + Clone>(base: &T, candidate: &T) -> T {
    if candidate.is_truthy() {
        candidate.clone()
    } else {
        base.clone()
    }
}

/// Whether a value counts as "provided" when merging.
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for PathBuf {
    fn is_truthy(&self) -> bool {
        !self.as_os_str().is_empty()
    }
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for u64 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for u16 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::is_truthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted() -> Options {
        Options {
            org_secret: "s3cret".into(),
            parent: "home.servers".into(),
            monitor_name: "web-01".into(),
            managed: Some(true),
            interval: Some(60),
            values: Some("1,2".into()),
            ..Options::default()
        }
    }

    #[test]
    fn truthy_overrides_win() {
        let overrides = Options {
            parent: "home.db".into(),
            interval: Some(30),
            value: Some(4.5),
            ..Options::default()
        };
        let merged = merge(&persisted(), &overrides).unwrap();
        assert_eq!(merged.parent, "home.db");
        assert_eq!(merged.interval, Some(30));
        assert_eq!(merged.value, Some(4.5));
        assert_eq!(merged.org_secret, "s3cret");
        assert_eq!(merged.values.as_deref(), Some("1,2"));
    }

    #[test]
    fn falsy_overrides_cannot_clear() {
        let overrides = Options {
            managed: Some(false),
            interval: Some(0),
            values: Some(String::new()),
            value: Some(0.0),
            ..Options::default()
        };
        let merged = merge(&persisted(), &overrides).unwrap();
        assert_eq!(merged.managed, Some(true));
        assert_eq!(merged.interval, Some(60));
        assert_eq!(merged.values.as_deref(), Some("1,2"));
        assert_eq!(merged.value, None);
    }

    #[test]
    fn merge_is_idempotent() {
        let overrides = Options {
            child: Some("db".into()),
            heartbeat_timeout: Some(120),
            ..Options::default()
        };
        let once = merge(&persisted(), &overrides).unwrap();
        let twice = merge(&once, &Options::default()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn short_interval_rejected_at_merge() {
        let overrides = Options {
            interval: Some(14),
            ..Options::default()
        };
        let err = merge(&persisted(), &overrides).unwrap_err();
        assert!(matches!(err, AgentError::IntervalTooShort(14)));

        let overrides = Options {
            interval: Some(15),
            ..Options::default()
        };
        assert!(merge(&persisted(), &overrides).is_ok());
    }

    #[test]
    fn byte_base_must_be_known() {
        let overrides = Options {
            byte_base: Some(512),
            ..Options::default()
        };
        assert!(matches!(
            merge(&Options::default(), &overrides),
            Err(AgentError::InvalidByteBase(512))
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let options = Options::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.org_secret, "");
        assert!(options.interval.is_none());
    }

    #[test]
    fn save_then_load_round_trips_without_absent_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let options = persisted();
        options.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("org_secret = \"s3cret\""));
        assert!(!content.contains("child"));
        assert!(!content.contains("heartbeat"));

        assert_eq!(Options::load(&path).unwrap(), options);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "interval = \"soon\"").unwrap();
        assert!(matches!(
            Options::load(&path),
            Err(AgentError::ConfigParse(_))
        ));
    }
}
