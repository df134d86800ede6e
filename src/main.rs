//! vtu-pulse daemon: run the live feed and log dashboard activity.
//!
//! With `VTU_PULSE__FEED__SERVER_URL` set, connects to the feed server;
//! without it, runs the event simulator. Either way the stream is folded
//! into the dashboard aggregator until ctrl-c.

use std::sync::Arc;

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

use vtu_pulse::application::{DashboardAggregator, LiveFeed};
use vtu_pulse::config::AppConfig;
use vtu_pulse::domain::{EventCategory, EventEnvelope, FeedError};
use vtu_pulse::ports::EventHandler;

/// Logs each delivered envelope at debug, connection changes at info.
struct LogHandler;

#[async_trait]
impl EventHandler for LogHandler {
    async fn handle(&self, envelope: EventEnvelope) -> Result<(), FeedError> {
        if envelope.category == EventCategory::Connection {
            tracing::info!(payload = %envelope.payload, "connection update");
        } else {
            tracing::debug!(category = %envelope.category, payload = %envelope.payload, "feed event");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LogHandler"
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            std::process::exit(1);
        }
    };
    if let Err(error) = config.validate() {
        eprintln!("invalid configuration: {error}");
        std::process::exit(1);
    }

    init_tracing();

    let feed = LiveFeed::from_config(&config.feed);
    let aggregator = Arc::new(DashboardAggregator::new(config.feed.aggregator_config()));
    feed.attach(aggregator.clone());
    feed.attach(Arc::new(LogHandler));

    tracing::info!(simulated = feed.is_simulated(), "vtu-pulse feed running");

    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
    }

    feed.shutdown();

    let metrics = aggregator.metrics();
    tracing::info!(
        transactions = metrics.transactions_seen,
        completed = metrics.completed,
        failed = metrics.failed,
        volume_kobo = metrics.total_volume,
        "feed stopped"
    );
}
