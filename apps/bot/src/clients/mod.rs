//! External collaborators: street-level imagery, the posting account, the
//! operator alert channel, and the checkpoint file.
//!
//! Each one sits behind a trait so the runner never depends on a concrete
//! service. No other module talks to the network.

use std::time::Duration;

use thiserror::Error;

pub mod alerts;
pub mod checkpoint;
pub mod poster;
pub mod streetview;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Gave up after {retries} attempts: {last}")]
    RetriesExhausted { retries: u32, last: String },
}

pub(crate) fn http_client() -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
