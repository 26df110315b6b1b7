use ays_common::error::Result;
use ays_payload::{merge, Options};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "ays-agent";
const CONFIG_FILE: &str = "config.toml";

/// Config file used when none is given: the platform config directory, or
/// `ays-agent.toml` in the working directory when there is none.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(format!("{APP_DIR}.toml")))
}

pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map(Path::to_path_buf).unwrap_or_else(default_path)
}

pub fn hostname() -> Option<String> {
    sysinfo::System::host_name()
}

/// Layers the options: host defaults, then the file at `path`, then
/// `overrides`.
pub fn load(path: &Path, overrides: &Options) -> Result<Options> {
    let defaults = Options {
        monitor_name: hostname().unwrap_or_default(),
        ..Options::default()
    };
    let persisted = Options::load(path)?;
    merge(&merge(&defaults, &persisted)?, overrides)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let path = Path::new("/tmp/agent.toml");
        assert_eq!(resolve_path(Some(path)), path);
        let fallback = resolve_path(None);
        assert!(fallback.ends_with(CONFIG_FILE) || fallback.ends_with("ays-agent.toml"));
    }

    #[test]
    fn layers_file_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        Options {
            org_secret: "from-file".into(),
            parent: "home".into(),
            monitor_name: "saved-name".into(),
            ..Options::default()
        }
        .save(&path)
        .unwrap();

        let overrides = Options {
            parent: "home.db".into(),
            ..Options::default()
        };
        let options = load(&path, &overrides).unwrap();
        assert_eq!(options.org_secret, "from-file");
        assert_eq!(options.parent, "home.db");
        assert_eq!(options.monitor_name, "saved-name");
    }

    #[test]
    fn monitor_name_falls_back_to_host_name() {
        let dir = tempfile::tempdir().unwrap();
        let options = load(&dir.path().join(CONFIG_FILE), &Options::default()).unwrap();
        assert_eq!(options.monitor_name, hostname().unwrap_or_default());
    }
}
