use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{http_client, ClientError};
use crate::config::PostingAccount;

/// Posts longer than this are likely to be rejected by the server.
pub const MAX_POST_CHARS: usize = 500;
const RETRY_COUNT: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Opaque identifier of a published post, usable as a reply target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostHandle(pub String);

#[async_trait]
pub trait Poster: Send + Sync {
    /// Publishes `message` with the given (already downloaded) images,
    /// optionally as a reply to an earlier post.
    async fn post(
        &self,
        message: &str,
        images: &[PathBuf],
        reply_to: Option<&PostHandle>,
    ) -> Result<PostHandle, ClientError>;
}

/// Logs what would be posted. Used with `--dry-run`.
#[derive(Default)]
pub struct DryRunPoster {
    counter: AtomicU64,
}

#[async_trait]
impl Poster for DryRunPoster {
    async fn post(
        &self,
        message: &str,
        images: &[PathBuf],
        reply_to: Option<&PostHandle>,
    ) -> Result<PostHandle, ClientError> {
        for image in images {
            info!("Not uploading: {}", image.display());
        }
        if let Some(parent) = reply_to {
            info!("Would reply to {}", parent.0);
        }
        info!("Not posting: {message}");
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Ok(PostHandle(format!("dry-run-{n}")))
    }
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Serialize)]
struct StatusRequest<'a> {
    status: &'a str,
    media_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    in_reply_to_id: Option<&'a str>,
}

/// Posts to a Mastodon-compatible server with a pre-issued access token.
#[derive(Clone)]
pub struct MastodonClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl MastodonClient {
    pub fn new(account: &PostingAccount) -> Result<Self, ClientError> {
        Ok(Self {
            client: http_client()?,
            base_url: account.base_url.clone(),
            access_token: account.access_token.clone(),
        })
    }

    /// Sends the request built by `build`, retrying while the server reports
    /// it is over capacity (503).
    async fn send_with_retry<F>(&self, build: F) -> Result<Response, ClientError>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut last_error: Option<ClientError> = None;

        for attempt in 0..RETRY_COUNT {
            if attempt > 0 {
                warn!(
                    "Post attempt {} failed, retrying after {}s...",
                    attempt,
                    RETRY_DELAY.as_secs()
                );
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let response = build().bearer_auth(&self.access_token).send().await?;
            let status = response.status();

            if status == StatusCode::SERVICE_UNAVAILABLE {
                let body = response.text().await.unwrap_or_default();
                warn!("Posting API returned {}: {}", status, body);
                last_error = Some(ClientError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                return Err(ClientError::Api {
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                });
            }

            return Ok(response);
        }

        Err(ClientError::RetriesExhausted {
            retries: RETRY_COUNT,
            last: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    async fn upload_media(&self, path: &Path) -> Result<String, ClientError> {
        info!("Uploading: {}", path.display());
        let body = Bytes::from(tokio::fs::read(path).await?);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let url = format!("{}/api/v2/media", self.base_url);

        let response = self
            .send_with_retry(|| {
                let part = Part::stream(body.clone()).file_name(file_name.clone());
                self.client.post(&url).multipart(Form::new().part("file", part))
            })
            .await?;
        let created: Created = response.json().await?;
        Ok(created.id)
    }
}

#[async_trait]
impl Poster for MastodonClient {
    async fn post(
        &self,
        message: &str,
        images: &[PathBuf],
        reply_to: Option<&PostHandle>,
    ) -> Result<PostHandle, ClientError> {
        let length = message.chars().count();
        if length > MAX_POST_CHARS {
            warn!("Post is {length} characters, over the {MAX_POST_CHARS} limit");
        }

        let mut media_ids = Vec::with_capacity(images.len());
        for image in images {
            media_ids.push(self.upload_media(image).await?);
        }

        let request = StatusRequest {
            status: message,
            media_ids,
            in_reply_to_id: reply_to.map(|h| h.0.as_str()),
        };
        let url = format!("{}/api/v1/statuses", self.base_url);

        info!("Posting: {message}");
        let response = self
            .send_with_retry(|| self.client.post(&url).json(&request))
            .await?;
        let created: Created = response.json().await?;
        Ok(PostHandle(created.id))
    }
}
