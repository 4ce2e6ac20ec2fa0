// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod cycle;
pub mod feed;
pub mod notify;
pub mod scheduler;
pub mod watermark;

// ---- Re-exports for stable public API ----
pub use crate::config::Config;
pub use crate::cycle::{CycleReport, Relay};
pub use crate::feed::{FeedItem, FeedSource, HttpFeedSource};
pub use crate::notify::{HttpWebhookSink, MessageTemplate, Notifier, WebhookSink};
pub use crate::watermark::{FileWatermarkStore, WatermarkStore};

use anyhow::Result;

/// Wire a production relay from loaded configuration: HTTP feed source, file
/// watermark store, and one webhook sink per configured URL.
pub fn build_relay(cfg: &Config) -> Result<Relay> {
    let template = MessageTemplate::from_path(&cfg.message.template)?;
    let sinks: Vec<Box<dyn WebhookSink>> = cfg
        .webhook
        .urls
        .iter()
        .cloned()
        .map(|url| {
            Box::new(HttpWebhookSink::new(url).with_timeout(cfg.http.timeout_secs))
                as Box<dyn WebhookSink>
        })
        .collect();

    let source = HttpFeedSource::new(cfg.rss_feed.url.clone(), cfg.http.timeout_secs)?;
    let store = FileWatermarkStore::new(cfg.state.path.clone());

    Ok(Relay::new(
        Box::new(source),
        Box::new(store),
        Notifier::new(template, sinks),
    ))
}
