use anyhow::Result;
use ays_agent::cli::Cli;
use ays_agent::monitor::ValueSource;
use ays_agent::service::{self, Agent};
use ays_agent::transport::{HttpTransport, Transport};
use ays_agent::{config, DEFAULT_MONITOR_INTERVAL_SECS, DEFAULT_PORT};
use ays_payload::compile;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::from_default_env();
    for target in ["ays_agent", "ays_payload", "ays_collector"] {
        filter = filter.add_directive(format!("{target}={level}").parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = config::resolve_path(cli.config.as_deref());
    let options = config::load(&config_path, &cli.overrides())?;

    // validates the options even when they are only being written
    let (destination, payload) = compile(&options)?;

    if cli.write_config {
        options.save(&config_path)?;
        return Ok(());
    }

    let source = ValueSource::from_options(&options)?;

    if cli.dry_run {
        print_dry_run(&destination, source.as_ref(), &payload)?;
        return Ok(());
    }

    let interval = options
        .interval
        .or_else(|| source.is_some().then_some(DEFAULT_MONITOR_INTERVAL_SECS));

    match interval {
        Some(interval_secs) => {
            let port = options.port.unwrap_or(DEFAULT_PORT);
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                config = %config_path.display(),
                "ays-agent starting as a service"
            );
            let agent = Agent::new(options, source, HttpTransport::new());
            service::run(agent, interval_secs, port).await
        }
        None => {
            HttpTransport::new()
                .send(&destination, &payload)
                .await
                .inspect_err(|e| tracing::error!(error = %e, "Report failed"))?;
            tracing::info!(monitor = %options.monitor_name, "Report delivered");
            Ok(())
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_dry_run(
    destination: &str,
    source: Option<&ValueSource>,
    payload: &ays_common::types::Payload,
) -> Result<()> {
    println!("destination: {destination}");
    if let Some(source) = source {
        println!("monitor: {}", source.describe());
    }
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}
