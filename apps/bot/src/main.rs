mod bot;
mod clients;
mod compose;
mod config;
mod dataset;
mod errors;
mod models;
mod state;
mod text;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::bot::runner::Runner;
use crate::clients::alerts::{Alerter, LogAlerter, SlackAlerter};
use crate::clients::checkpoint::CheckpointStore;
use crate::clients::poster::{DryRunPoster, MastodonClient, Poster};
use crate::clients::streetview::{ImageFetcher, NoImages, StreetViewClient};
use crate::compose::selector::ReplySelector;
use crate::config::Config;
use crate::dataset::parcels::ParcelRows;
use crate::state::{AppState, Catalog};

/// Posts a description of one parcel per interval, with a census or transit
/// follow-up as a reply.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Log posts instead of publishing them (also `DRY_RUN=true`)
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Stop after this many records have been posted
    #[arg(long)]
    max_records: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting parcelbot v{}", env!("CARGO_PKG_VERSION"));

    let catalog = Catalog::load(&config)?;

    let poster: Arc<dyn Poster> = if cli.dry_run || config.dry_run {
        info!("Dry run: posts will be logged, not published");
        Arc::new(DryRunPoster::default())
    } else {
        Arc::new(MastodonClient::new(config.require_posting()?)?)
    };

    let images: Arc<dyn ImageFetcher> = match &config.google_maps_api_key {
        Some(key) => Arc::new(StreetViewClient::new(key.clone())?),
        None => {
            warn!("GOOGLE_MAPS_API_KEY is not set; primary posts will have no image");
            Arc::new(NoImages)
        }
    };

    let alerter: Arc<dyn Alerter> = match &config.slack {
        Some(slack) => Arc::new(SlackAlerter::new(slack.clone())?),
        None => Arc::new(LogAlerter),
    };

    let selector = ReplySelector::new(config.reply_composers.clone())?;
    info!(
        "Reply composers enabled: {}",
        selector
            .enabled()
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let checkpoint = CheckpointStore::new(config.status_file.clone());
    let start_at = checkpoint.resume_index().await?;
    info!("Resuming at row {start_at}");
    let rows = ParcelRows::open(&config.parcels_csv, start_at)?;

    let state = AppState {
        catalog: Arc::new(catalog),
        poster,
        images,
        alerter,
        checkpoint,
        selector,
        config,
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(true);
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {e}"),
        }
    });

    let summary = Runner::new(state, shutdown_rx, cli.max_records).run(rows).await;
    if summary.interrupted {
        info!("Stopped by operator");
    }

    Ok(())
}
