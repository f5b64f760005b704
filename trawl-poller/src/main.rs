//! Trawl Poller
//!
//! Polls a remote search head on a fixed interval and streams the resulting
//! events to stdout, one line per event.
//!
//! Architecture:
//! - Configuration: endpoint pool, credentials, and search parameters from
//!   the environment
//! - Client: session acquisition with caching, probing, and failover
//!   (trawl-client)
//! - Scheduler: the fixed-interval polling loop
//! - Sink: line-oriented writer fed through a bounded channel
//!
//! A failed cycle, including one where no server is reachable, is logged
//! and skipped; the next tick starts over from cached session state.

mod config;
mod reader;
mod scheduler;
mod sink;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trawl_client::{HttpConnector, SessionBroker};

use crate::config::Config;
use crate::reader::SearchReader;
use crate::scheduler::EventPoller;
use crate::sink::LineSink;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trawl_poller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Trawl poller");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    info!(
        "Loaded configuration: hosts={:?}, poll interval={:?}",
        config.hosts, config.poll_interval
    );

    // Build the session broker over the failover pool
    let broker = SessionBroker::new(HttpConnector::new(), config.endpoints());
    let reader = Arc::new(SearchReader::new(broker, config.query()));

    info!("Session broker initialized ({} endpoint(s))", config.hosts.len());

    // Wire the delivery channel and the stdout sink
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let sink_task = tokio::spawn(async move {
        let mut sink = LineSink::new(tokio::io::stdout());
        sink.run(rx).await
    });

    // Start the polling loop; it only returns, as an error, once the sink
    // is gone
    let poller = EventPoller::new(config.poll_interval, reader, tx);
    let err = match poller.run().await {
        Ok(never) => match never {},
        Err(e) => e,
    };
    error!("Poller error: {}", err);
    sink_task.await??;
    Err(err)
}
