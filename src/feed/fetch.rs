// src/feed/fetch.rs
use std::time::Duration;

use metrics::counter;
use reqwest::Client;

use crate::feed::repair::repair_named_entities;

// The feed host is picky about default library user agents.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Source of raw feed text. `None` means "nothing usable this cycle": the
/// orchestrator skips the cycle with no state change and the next tick retries
/// naturally. Implementors log the cause themselves.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Option<String>;
}

pub struct HttpFeedSource {
    url: String,
    client: Client,
}

impl HttpFeedSource {
    pub fn new(url: String, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { url, client })
    }
}

#[async_trait::async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Option<String> {
        let resp = match self.client.get(&self.url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, url = %self.url, "feed fetch failed");
                counter!("relay_fetch_errors_total").increment(1);
                return None;
            }
        };

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = %status, url = %self.url, "feed fetch non-success status");
            counter!("relay_fetch_errors_total").increment(1);
            return None;
        }

        match resp.text().await {
            Ok(body) => Some(repair_named_entities(&body)),
            Err(e) => {
                tracing::warn!(error = %e, url = %self.url, "feed body read failed");
                counter!("relay_fetch_errors_total").increment(1);
                None
            }
        }
    }
}
