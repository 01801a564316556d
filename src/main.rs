use anyhow::{bail, Context};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use rusty_signs::args::Args;
use rusty_signs::classifier::load_classifier;
use rusty_signs::config::ServiceConfig;
use rusty_signs::labels::LabelMap;
use rusty_signs::logging;
use rusty_signs::pipeline::{InferencePipeline, ModelStatus};
use rusty_signs::streaming::{self, AppState};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 0. Config + logging
    let (mut config, note) = ServiceConfig::load(&args.config)?;
    config.apply_args(&args);
    logging::init(&config.log_filter);
    note.report();

    // 1. Model, loaded once and shared read-only by every session
    let (classifier, status) = load_classifier(&config.model);
    if let ModelStatus::Unavailable { reason } = &status {
        if config.model.require {
            bail!("model is required but could not be loaded: {}", reason);
        }
        warn!("Serving without a model; every prediction will fail until restart");
    }

    let pipeline = InferencePipeline::new(classifier, LabelMap::sibi());
    info!("Active pipeline: {}", pipeline.name());

    // 2. Serve
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    streaming::serve(listener, AppState::new(pipeline, status), shutdown_signal()).await
}
