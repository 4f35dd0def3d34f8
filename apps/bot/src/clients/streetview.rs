use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{http_client, ClientError};

const METADATA_URL: &str = "https://maps.googleapis.com/maps/api/streetview/metadata";
const IMAGE_URL: &str = "https://maps.googleapis.com/maps/api/streetview";
const IMAGE_SIZE: &str = "1200x675";

/// Downloads at most one image for a location to `dest`.
///
/// "No imagery here" is not an error: the fetcher returns `Ok(())` and leaves
/// `dest` absent. Callers check the filesystem.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, location: &str, dest: &Path) -> Result<(), ClientError>;
}

/// Used when no imagery key is configured. Never writes anything.
pub struct NoImages;

#[async_trait]
impl ImageFetcher for NoImages {
    async fn fetch(&self, location: &str, _dest: &Path) -> Result<(), ClientError> {
        debug!("No image fetcher configured, skipping {location}");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Metadata {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
}

/// Google Street View Static API client.
#[derive(Clone)]
pub struct StreetViewClient {
    client: Client,
    api_key: String,
}

impl StreetViewClient {
    pub fn new(api_key: String) -> Result<Self, ClientError> {
        Ok(Self {
            client: http_client()?,
            api_key,
        })
    }

    async fn metadata(&self, location: &str) -> Result<Metadata, ClientError> {
        let response = self
            .client
            .get(METADATA_URL)
            .query(&[("location", location), ("key", self.api_key.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ImageFetcher for StreetViewClient {
    async fn fetch(&self, location: &str, dest: &Path) -> Result<(), ClientError> {
        let metadata = self.metadata(location).await?;
        match metadata.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" | "NOT_FOUND" => {
                info!("No street-level imagery for {location} ({})", metadata.status);
                return Ok(());
            }
            other => {
                return Err(ClientError::Api {
                    status: 200,
                    message: format!(
                        "metadata status {other}: {}",
                        metadata.error_message.unwrap_or_default()
                    ),
                })
            }
        }

        let response = self
            .client
            .get(IMAGE_URL)
            .query(&[
                ("size", IMAGE_SIZE),
                ("location", location),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: bytes::Bytes = response.bytes().await?;
        tokio::fs::write(dest, &body).await?;
        info!(
            "Downloaded {} byte image for {location} to {}",
            body.len(),
            dest.display()
        );
        Ok(())
    }
}
