use ays_payload::Options;
use clap::Parser;
use std::path::PathBuf;

/// Report values, statuses and heartbeats to @ys.
///
/// Options given here override the ones saved in the config file.
#[derive(Debug, Parser)]
#[command(name = "ays-agent", version)]
pub struct Cli {
    /// Config file to load (and write with --write-config).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// URL of the @ys agent endpoint.
    #[arg(long)]
    pub server: Option<String>,

    /// Organization secret. Required to interact with the org's system graph.
    #[arg(long, env = "AYS_ORG_SECRET", hide_env_values = true)]
    pub org_secret: Option<String>,

    /// Seconds between reports. Makes the agent a long-running service
    /// (minimum 15; monitors default to 300).
    #[arg(long)]
    pub interval: Option<u64>,

    /// Port of the local test endpoint while running as a service.
    #[arg(long)]
    pub port: Option<u16>,

    /// Parent node path this agent relates to.
    #[arg(long)]
    pub parent: Option<String>,

    /// Monitor name. Defaults to the host name.
    #[arg(long)]
    pub monitor_name: Option<String>,

    /// Relative path of a child node under the parent.
    #[arg(long)]
    pub child: Option<String>,

    /// Create a child node named after the monitor.
    #[arg(long)]
    pub create_child: bool,

    /// Type of the created child node (machine, service, vendor).
    #[arg(long)]
    pub node_type: Option<String>,

    /// The agent manages its own configuration.
    #[arg(long)]
    pub managed: Option<bool>,

    /// Seconds without a report before the monitor is considered unhealthy.
    #[arg(long)]
    pub heartbeat_timeout: Option<u64>,

    /// Level entered when the heartbeat times out (warning, error, critical).
    #[arg(long)]
    pub heartbeat_level: Option<String>,

    /// Single value to report.
    #[arg(long, allow_negative_numbers = true)]
    pub value: Option<f64>,

    /// Name of the single value.
    #[arg(long)]
    pub value_name: Option<String>,

    /// Threshold for the single value: <N, >N, eN, neN or N-N, optionally
    /// followed by :warning, :error or :critical.
    #[arg(long)]
    pub value_threshold: Option<String>,

    /// Comma-separated values to report.
    #[arg(long, allow_hyphen_values = true)]
    pub values: Option<String>,

    /// Comma-separated names, one per value.
    #[arg(long)]
    pub value_names: Option<String>,

    /// Comma-separated thresholds, one per value (blank for none).
    #[arg(long)]
    pub value_thresholds: Option<String>,

    /// Why the status is changing. Defaults to an empty message.
    #[arg(long)]
    pub status_message: Option<String>,

    /// Status to report (healthy, warning, error, critical). Defaults to critical.
    #[arg(long)]
    pub status_state: Option<String>,

    /// Sample system resources: all, cpu, hdd, ram, net (comma-separated).
    #[arg(long)]
    pub monitor_resources: Option<String>,

    /// Report the last line of a CSV file.
    #[arg(long, value_name = "PATH")]
    pub monitor_file: Option<PathBuf>,

    /// Run a program and report the values it prints.
    #[arg(long, value_name = "COMMAND")]
    pub monitor_program: Option<String>,

    /// Byte divisor for rates (1000 or 1024). Defaults to the platform's.
    #[arg(long)]
    pub byte_base: Option<u64>,

    /// Write all options to the config file and exit.
    #[arg(long)]
    pub write_config: bool,

    /// Print what would be sent without sending it.
    #[arg(long)]
    pub dry_run: bool,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Options given on the command line, for merging over the config file.
    pub fn overrides(&self) -> Options {
        Options {
            org_secret: self.org_secret.clone().unwrap_or_default(),
            server: self.server.clone().unwrap_or_default(),
            parent: self.parent.clone().unwrap_or_default(),
            monitor_name: self.monitor_name.clone().unwrap_or_default(),
            interval: self.interval,
            port: self.port,
            child: self.child.clone(),
            create_child: Some(self.create_child),
            node_type: self.node_type.clone(),
            managed: self.managed,
            heartbeat_timeout: self.heartbeat_timeout,
            heartbeat_level: self.heartbeat_level.clone(),
            value: self.value,
            value_name: self.value_name.clone(),
            value_threshold: self.value_threshold.clone(),
            values: self.values.clone(),
            value_names: self.value_names.clone(),
            value_thresholds: self.value_thresholds.clone(),
            status_message: self.status_message.clone(),
            status_state: self.status_state.clone(),
            monitor_resources: self.monitor_resources.clone(),
            monitor_file: self.monitor_file.clone(),
            monitor_program: self.monitor_program.clone(),
            byte_base: self.byte_base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_map_onto_options() {
        let cli = Cli::parse_from([
            "ays-agent",
            "--org-secret",
            "s3cret",
            "--parent",
            "home.servers",
            "--values",
            "4.1,5.0",
            "--value-thresholds",
            "10-20:warning,",
            "--value",
            "-3.5",
            "--create-child",
            "--managed",
            "false",
        ]);
        let options = cli.overrides();
        assert_eq!(options.org_secret, "s3cret");
        assert_eq!(options.parent, "home.servers");
        assert_eq!(options.values.as_deref(), Some("4.1,5.0"));
        assert_eq!(options.value_thresholds.as_deref(), Some("10-20:warning,"));
        assert_eq!(options.value, Some(-3.5));
        assert_eq!(options.create_child, Some(true));
        assert_eq!(options.managed, Some(false));
        assert_eq!(options.monitor_name, "");
        assert!(options.interval.is_none());
    }
}
