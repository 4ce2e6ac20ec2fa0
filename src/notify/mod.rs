// src/notify/mod.rs
pub mod template;
pub mod webhook;

use metrics::counter;

use crate::feed::FeedItem;
pub use template::MessageTemplate;
pub use webhook::{HttpWebhookSink, WebhookSink};

/// Fan-out over all configured sinks. Dispatch is fire-and-forget from the
/// orchestrator's point of view: render and per-sink errors are logged and
/// counted here, never raised.
pub struct Notifier {
    template: MessageTemplate,
    sinks: Vec<Box<dyn WebhookSink>>,
}

impl Notifier {
    pub fn new(template: MessageTemplate, sinks: Vec<Box<dyn WebhookSink>>) -> Self {
        Self { template, sinks }
    }

    pub async fn dispatch(&self, item: &FeedItem, timestamp_iso: &str) {
        let payload = match self.template.render(item, timestamp_iso) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, title = %item.title, "message render failed, item not delivered");
                counter!("relay_render_errors_total").increment(1);
                return;
            }
        };

        for sink in &self.sinks {
            if let Err(e) = sink.deliver(&payload).await {
                tracing::warn!(error = %e, sink = sink.endpoint(), title = %item.title, "webhook delivery failed");
                counter!("relay_delivery_errors_total").increment(1);
            }
        }
    }
}
