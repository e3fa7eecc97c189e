use anyhow::{Context, Result};
use slack_translator::bot::Bot;
use slack_translator::config::Config;
use slack_translator::dedup::DedupCache;
use slack_translator::detect::{Detector, LinguaBuilder};
use slack_translator::metrics::BotMetrics;
use slack_translator::server::{self, AppState};
use slack_translator::slack::SlackClient;
use slack_translator::translation::OpenAiTranslator;
use slack_translator::{scheduler, store};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Pending events buffered between the HTTP handlers and the router
const EVENT_QUEUE_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slack_translator=info".parse()?),
        )
        .init();

    info!("Starting Slack translator");

    let config = Config::from_env()?;
    let http = reqwest::Client::new();

    let transport = Arc::new(SlackClient::from_config(http.clone(), &config));
    let translator = Arc::new(OpenAiTranslator::from_config(http, &config));

    // Building the detection models is the slow part of startup
    info!("Building language detection engines");
    let detector = Detector::new(Arc::new(LinguaBuilder::preloaded()))
        .with_threshold(config.detection_threshold);

    // Restore channel settings; refuse to start rather than overwrite them on shutdown
    let blob_store = store::open_store(&config.datastore_path).await?;
    let registry = store::restore_registry(blob_store.as_ref(), detector.builder())
        .await
        .context("Saved channel settings could not be restored")?;

    let dedup = Arc::new(DedupCache::new(config.dedup_ttl));
    let mut jobs = scheduler::start_scheduler(Arc::clone(&dedup), config.dedup_sweep_interval).await?;

    let metrics = Arc::new(BotMetrics::new());
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

    let bot = Bot::new(transport, translator, detector, registry, dedup)
        .with_metrics(Arc::clone(&metrics))
        .with_translation_timeout(config.translation_timeout);
    let router = tokio::spawn(bot.run(rx));

    let state = AppState {
        events: tx,
        verification_token: config.slack_verification_token.clone(),
        metrics: Arc::clone(&metrics),
    };
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    server::serve(listener, state, shutdown_signal()).await?;

    // The server owned the only sender, so the router drains and stops
    info!("Waiting for pending events to finish");
    let registry = router.await?;

    if let Err(e) = store::save_registry(blob_store.as_ref(), &registry).await {
        error!("Failed to save channel settings: {:#}", e);
    }

    if let Err(e) = jobs.shutdown().await {
        warn!("Scheduler did not shut down cleanly: {}", e);
    }

    info!(
        "Final metrics: {}",
        serde_json::to_string(&metrics.report())?
    );
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
