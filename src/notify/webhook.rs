// src/notify/webhook.rs
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

/// A configured delivery endpoint. Failures are per-sink: the mux logs them
/// and moves on, so one dead webhook never starves the others.
#[async_trait::async_trait]
pub trait WebhookSink: Send + Sync {
    async fn deliver(&self, payload: &Value) -> Result<()>;

    /// Identifier for logs.
    fn endpoint(&self) -> &str;
}

pub struct HttpWebhookSink {
    url: String,
    client: Client,
    timeout: Duration,
}

impl HttpWebhookSink {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait::async_trait]
impl WebhookSink for HttpWebhookSink {
    async fn deliver(&self, payload: &Value) -> Result<()> {
        self.client
            .post(&self.url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .context("webhook post")?
            .error_for_status()
            .context("webhook non-2xx")?;
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
