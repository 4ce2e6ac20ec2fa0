// tests/notify_sinks.rs
// One failing webhook must never starve the others.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use feed_relay::feed::{repair_named_entities, FeedSource};
use feed_relay::notify::{MessageTemplate, Notifier, WebhookSink};
use feed_relay::watermark::MemoryWatermarkStore;
use feed_relay::Relay;
use serde_json::Value;

struct FixtureSource(String);

#[async_trait::async_trait]
impl FeedSource for FixtureSource {
    async fn fetch(&self) -> Option<String> {
        Some(repair_named_entities(&self.0))
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    calls: Arc<Mutex<Vec<Value>>>,
}

#[async_trait::async_trait]
impl WebhookSink for RecordingSink {
    async fn deliver(&self, payload: &Value) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(payload.clone());
        Ok(())
    }

    fn endpoint(&self) -> &str {
        "recording://sink"
    }
}

/// Always answers like a webhook returning HTTP 500.
#[derive(Clone, Default)]
struct BrokenSink {
    attempts: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl WebhookSink for BrokenSink {
    async fn deliver(&self, _payload: &Value) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("webhook non-2xx: 500 Internal Server Error"))
    }

    fn endpoint(&self) -> &str {
        "broken://sink"
    }
}

const FEED_XML: &str = include_str!("fixtures/addon_feed.xml");

#[tokio::test]
async fn failing_sink_does_not_block_healthy_sink_or_watermark() {
    let store = MemoryWatermarkStore::new(0);
    let healthy = RecordingSink::default();
    let broken = BrokenSink::default();

    let template =
        MessageTemplate::from_raw(r#"{"content": "$title", "timestamp": "$timestamp"}"#);
    let relay = Relay::new(
        Box::new(FixtureSource(FEED_XML.to_string())),
        Box::new(store.clone()),
        Notifier::new(
            template,
            vec![Box::new(broken.clone()), Box::new(healthy.clone())],
        ),
    );

    let report = relay.run_cycle().await;
    assert_eq!(report.dispatched, 3);

    // The broken sink was attempted for every item and failed every time,
    // yet the healthy sink received every payload.
    assert_eq!(broken.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(healthy.calls.lock().unwrap().len(), 3);

    // Delivery failures never hold back the watermark.
    assert_eq!(store.save_count(), 1);
    assert!(store.value() > 0);
}

#[tokio::test]
async fn all_sinks_receive_identical_payloads() {
    let a = RecordingSink::default();
    let b = RecordingSink::default();
    let template = MessageTemplate::from_raw(r#"{"content": "$title"}"#);
    let relay = Relay::new(
        Box::new(FixtureSource(FEED_XML.to_string())),
        Box::new(MemoryWatermarkStore::new(0)),
        Notifier::new(template, vec![Box::new(a.clone()), Box::new(b.clone())]),
    );

    relay.run_cycle().await;
    assert_eq!(*a.calls.lock().unwrap(), *b.calls.lock().unwrap());
}
