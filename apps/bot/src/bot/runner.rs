//! The posting loop.
//!
//! Per record: checkpoint → primary post (with street-level image) → reply
//! post from a randomly chosen composer → pause. The loop is the only place
//! errors are recovered: a failed record is reported to the operator channel
//! and the loop moves on after the recovery delay.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::compose::parcel::compose_parcel;
use crate::models::parcel::ParcelRecord;
use crate::state::AppState;

pub const NO_IMAGE_NOTICE: &str = "There is no image available for this parcel.";
pub const MISSING_REPLY_IMAGE_NOTICE: &str = "The image for this post is not available.";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub interrupted: bool,
}

enum Flow {
    Continue,
    Interrupted,
}

pub struct Runner {
    state: AppState,
    shutdown: watch::Receiver<bool>,
    max_records: Option<usize>,
}

/// "message (1/2)"
fn numbered(message: &str, part: usize, total: usize) -> String {
    format!("{message} ({part}/{total})")
}

async fn remove_if_present(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {e}", path.display()),
    }
}

/// Keeps the images that exist on disk, logging the ones that do not.
fn existing_images(images: Vec<PathBuf>) -> Vec<PathBuf> {
    images
        .into_iter()
        .filter(|path| {
            let present = path.is_file();
            if !present {
                warn!("Image {} does not exist, posting without it", path.display());
            }
            present
        })
        .collect()
}

/// Resolves once shutdown is requested. Never resolves if the sender is gone.
async fn shutdown_requested(mut shutdown: watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

impl Runner {
    pub fn new(state: AppState, shutdown: watch::Receiver<bool>, max_records: Option<usize>) -> Self {
        Self {
            state,
            shutdown,
            max_records,
        }
    }

    /// Composes and publishes both posts for one record.
    ///
    /// The checkpoint is written before any network call, so an interrupted
    /// record is skipped on restart rather than posted twice.
    pub async fn process_record(&self, index: usize, record: &ParcelRecord) -> Result<()> {
        info!("Gathering information for row: {index}");
        self.state.checkpoint.save(index).await?;

        let catalog = &self.state.catalog;
        let parcel = compose_parcel(record, catalog)
            .with_context(|| format!("Failed to compose primary post for row {index}"))?;
        info!("Composed primary post for {}", parcel.address);

        let image_path = self.state.config.street_image_path();
        remove_if_present(&image_path).await;
        match &parcel.image_location {
            Some(location) => self
                .state
                .images
                .fetch(location, &image_path)
                .await
                .with_context(|| format!("Failed to fetch image for {location}"))?,
            None => warn!("Row {index} has neither a street number nor coordinates"),
        }

        let (message, images) = if image_path.is_file() {
            (parcel.message, vec![image_path.clone()])
        } else {
            (format!("{} {NO_IMAGE_NOTICE}", parcel.message), Vec::new())
        };

        let main_post = self
            .state
            .poster
            .post(&numbered(&message, 1, 2), &images, None)
            .await
            .context("Failed to publish primary post")?;
        remove_if_present(&image_path).await;

        let kind = self.state.selector.choose(&mut rand::thread_rng());
        info!("Creating reply post using composer: {kind}");
        let reply = kind
            .compose(record, catalog)
            .with_context(|| format!("Failed to compose {kind} reply for row {index}"))?;

        let wanted = reply.images.len();
        let reply_images = existing_images(reply.images);
        let reply_message = if reply_images.len() < wanted {
            format!("{} {MISSING_REPLY_IMAGE_NOTICE}", reply.message)
        } else {
            reply.message
        };

        let reply_text = numbered(&reply_message, 2, 2);
        let reply_text = match &self.state.config.reply_mention {
            Some(mention) => format!("{mention} {reply_text}"),
            None => reply_text,
        };
        self.state
            .poster
            .post(&reply_text, &reply_images, Some(&main_post))
            .await
            .context("Failed to publish reply post")?;

        Ok(())
    }

    /// Sleeps for `duration` unless shutdown is requested first.
    async fn pause(&self, duration: Duration) -> Flow {
        tokio::select! {
            biased;
            _ = shutdown_requested(self.shutdown.clone()) => Flow::Interrupted,
            _ = tokio::time::sleep(duration) => Flow::Continue,
        }
    }

    async fn recover(&self, index: usize, err: &anyhow::Error) -> Flow {
        error!("Row {index} failed: {err:#}");
        let delay = self.state.config.recovery_delay;
        let summary = format!(
            "{} crashed on row {index} at {}! Details attached. Restarting in {} seconds.",
            env!("CARGO_PKG_NAME"),
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            delay.as_secs()
        );
        if let Err(alert_err) = self.state.alerter.alert(&summary, &format!("{err:?}")).await {
            warn!("Failed to send alert: {alert_err}");
        }
        self.pause(delay).await
    }

    /// Processes rows in order until they run out, `max_records` is reached,
    /// or shutdown is requested.
    pub async fn run<I>(&self, rows: I) -> RunSummary
    where
        I: IntoIterator<Item = (usize, Result<ParcelRecord>)>,
    {
        let mut summary = RunSummary::default();

        for (index, row) in rows {
            if self.max_records.is_some_and(|max| summary.processed >= max) {
                info!("Reached the limit of {} records", summary.processed);
                break;
            }

            let record = match row {
                Ok(record) => record,
                Err(err) => {
                    summary.failed += 1;
                    match self.recover(index, &err).await {
                        Flow::Continue => continue,
                        Flow::Interrupted => {
                            summary.interrupted = true;
                            break;
                        }
                    }
                }
            };

            if let Some(reason) = record.skip_reason() {
                info!("Skipping row {index}, reason: {reason}");
                summary.skipped += 1;
                continue;
            }

            let outcome = tokio::select! {
                biased;
                _ = shutdown_requested(self.shutdown.clone()) => None,
                result = self.process_record(index, &record) => Some(result),
            };

            let flow = match outcome {
                None => Flow::Interrupted,
                Some(Ok(())) => {
                    summary.processed += 1;
                    if self.max_records.is_some_and(|max| summary.processed >= max) {
                        Flow::Continue
                    } else {
                        self.pause(self.state.config.post_interval).await
                    }
                }
                Some(Err(err)) => {
                    summary.failed += 1;
                    self.recover(index, &err).await
                }
            };

            if let Flow::Interrupted = flow {
                warn!("Interrupted, stopping after row {index}");
                summary.interrupted = true;
                break;
            }
        }

        info!(
            "Run finished: {} processed, {} skipped, {} failed",
            summary.processed, summary.skipped, summary.failed
        );
        summary
    }
}
