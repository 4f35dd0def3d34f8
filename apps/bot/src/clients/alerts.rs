use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{http_client, ClientError};
use crate::config::SlackSettings;

const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Operator notification channel for unrecoverable per-record failures.
#[async_trait]
pub trait Alerter: Send + Sync {
    async fn alert(&self, summary: &str, detail: &str) -> Result<(), ClientError>;
}

/// Writes alerts to the log. Used when no Slack channel is configured.
pub struct LogAlerter;

#[async_trait]
impl Alerter for LogAlerter {
    async fn alert(&self, summary: &str, detail: &str) -> Result<(), ClientError> {
        error!("{summary}\n{detail}");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: String,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct SlackAlerter {
    client: Client,
    settings: SlackSettings,
}

impl SlackAlerter {
    pub fn new(settings: SlackSettings) -> Result<Self, ClientError> {
        Ok(Self {
            client: http_client()?,
            settings,
        })
    }
}

/// Summary line followed by the detail in a code block.
fn slack_text(summary: &str, detail: &str) -> String {
    format!("{summary}\n```\n{}\n```", detail.replace("```", "'''"))
}

#[async_trait]
impl Alerter for SlackAlerter {
    async fn alert(&self, summary: &str, detail: &str) -> Result<(), ClientError> {
        let body = PostMessage {
            channel: &self.settings.channel,
            text: slack_text(summary, detail),
        };
        let response = self
            .client
            .post(SLACK_POST_MESSAGE_URL)
            .bearer_auth(&self.settings.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let parsed: SlackResponse = response.json().await?;
        if !parsed.ok {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: parsed.error.unwrap_or_else(|| "unknown Slack error".to_string()),
            });
        }
        Ok(())
    }
}
