use crate::monitor::ValueSource;
use crate::transport::Transport;
use anyhow::Result;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use ays_payload::{compile_with, Options};
use std::future::Future;
use std::net::SocketAddr;
use tokio::signal;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

/// One monitor reporting through one transport.
pub struct Agent<T> {
    options: Options,
    source: Option<ValueSource>,
    transport: T,
    last_tick: Option<Instant>,
}

impl<T: Transport> Agent<T> {
    pub fn new(options: Options, source: Option<ValueSource>, transport: T) -> Self {
        Self {
            options,
            source,
            transport,
            last_tick: None,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Captures sampler baselines so the first tick can report rates.
    pub fn start(&mut self) {
        if let Some(source) = self.source.as_mut() {
            source.start();
        }
        self.last_tick = Some(Instant::now());
    }

    /// Reads the monitor (if any), compiles the payload and sends it.
    pub async fn tick(&mut self) -> Result<()> {
        let now = Instant::now();
        let elapsed = self
            .last_tick
            .map(|last| now.duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        let sampled = match self.source.as_mut() {
            Some(source) => Some(source.read(&self.options, elapsed).await?),
            None => None,
        };
        let count = sampled.as_ref().map(Vec::len);

        let (destination, payload) = compile_with(&self.options, sampled)?;
        self.transport.send(&destination, &payload).await?;

        tracing::info!(
            monitor = %self.options.monitor_name,
            values = ?count,
            "Report delivered"
        );
        Ok(())
    }
}

/// Local endpoint used to check that the service is alive.
pub fn router() -> Router {
    Router::new().route("/test/", get(|| async { StatusCode::NO_CONTENT }))
}

/// Reports every `interval_secs` until ctrl-c, serving [`router`] on `port`.
///
/// A failed tick is logged and the loop keeps going.
pub async fn run<T: Transport>(mut agent: Agent<T>, interval_secs: u64, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Test endpoint listening");
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router()).await {
            tracing::error!(error = %e, "Test endpoint stopped");
        }
    });

    tracing::info!(
        interval_secs,
        monitor = %agent.options().monitor_name,
        parent = %agent.options().parent,
        "Starting report loop"
    );
    report_loop(&mut agent, Duration::from_secs(interval_secs), async {
        // a failing signal handler must not end the loop
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    })
    .await;

    server.abort();
    Ok(())
}

/// Starts the agent and ticks it every `period` until `shutdown` resolves.
///
/// The first tick comes one full period after [`Agent::start`], so rates are
/// measured over the configured interval. A tick in progress is abandoned on
/// shutdown.
pub async fn report_loop<T, F>(agent: &mut Agent<T>, period: Duration, shutdown: F)
where
    T: Transport,
    F: Future<Output = ()>,
{
    agent.start();
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                tokio::select! {
                    result = agent.tick() => {
                        if let Err(e) = result {
                            tracing::error!(error = %e, "Report failed");
                        }
                    }
                    _ = &mut shutdown => break,
                }
            }
            _ = &mut shutdown => break,
        }
    }
    tracing::info!("Shutting down gracefully");
}
