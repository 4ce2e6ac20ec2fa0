// src/cycle.rs
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use time::{macros::format_description, OffsetDateTime, UtcOffset};

use crate::feed::{parse_feed, FeedSource};
use crate::notify::Notifier;
use crate::watermark::WatermarkStore;

/// One-time metrics registration (so series carry descriptions).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("relay_cycles_total", "Completed polling cycles.");
        describe_counter!("relay_items_seen_total", "Items parsed from the feed.");
        describe_counter!(
            "relay_items_dispatched_total",
            "New items whose delivery was attempted (once each)."
        );
        describe_counter!("relay_fetch_errors_total", "Feed fetch failures.");
        describe_counter!("relay_parse_errors_total", "Feed parse failures.");
        describe_counter!(
            "relay_render_errors_total",
            "Message template render failures."
        );
        describe_counter!(
            "relay_delivery_errors_total",
            "Per-sink webhook delivery failures."
        );
        describe_histogram!("relay_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("relay_watermark", "Current persisted watermark (unix seconds).");
        describe_gauge!("relay_last_run_ts", "Unix ts when a cycle last finished.");
    });
}

/// Outcome of a single cycle, for logs and tests. Not persisted.
#[derive(Debug, Clone, Copy)]
pub struct CycleReport {
    /// False when the fetch yielded nothing and the cycle was skipped.
    pub fetched: bool,
    /// Items parsed from the feed this cycle.
    pub seen: usize,
    /// Items new relative to the entry watermark whose delivery was attempted
    /// (attempted once each; a failed attempt still counts).
    pub dispatched: usize,
    /// Watermark after the cycle (unchanged unless something was new).
    pub watermark: u64,
}

/// The polling relay: fetch → parse → filter → deliver → commit. Collaborators
/// are trait objects so tests inject doubles instead of real I/O.
pub struct Relay {
    source: Box<dyn FeedSource>,
    store: Box<dyn WatermarkStore>,
    notifier: Notifier,
}

impl Relay {
    pub fn new(
        source: Box<dyn FeedSource>,
        store: Box<dyn WatermarkStore>,
        notifier: Notifier,
    ) -> Self {
        ensure_metrics_described();
        Self {
            source,
            store,
            notifier,
        }
    }

    /// Run one full cycle. Never fails: fetch and parse problems degrade to
    /// "zero new items", delivery problems are isolated per sink, and only a
    /// strictly advanced watermark is written back.
    pub async fn run_cycle(&self) -> CycleReport {
        let last_seen = self.store.load().await;

        let Some(xml) = self.source.fetch().await else {
            // Only early-exit path: no state change, next tick retries.
            tracing::info!(watermark = last_seen, "cycle skipped, no feed content");
            return CycleReport {
                fetched: false,
                seen: 0,
                dispatched: 0,
                watermark: last_seen,
            };
        };

        // Feeds list newest first; deliveries must go out oldest to newest.
        let mut items = parse_feed(&xml);
        items.reverse();

        let mut next = last_seen;
        let mut dispatched = 0usize;
        for item in &items {
            let ts = item.published_unix();
            // Strict comparison: a timestamp equal to the watermark was already
            // notified in a prior cycle.
            if ts <= last_seen {
                continue;
            }

            let timestamp_iso = format_iso8601(item.published_at);
            self.notifier.dispatch(item, &timestamp_iso).await;
            tracing::info!(title = %item.title, ts, "new item relayed");
            dispatched += 1;
            next = next.max(ts);
        }

        if next > last_seen {
            if let Err(e) = self.store.save(next).await {
                // The one condition that risks duplicate notifications after a
                // restart, so it gets the loud treatment.
                tracing::error!(error = %e, watermark = next, "failed to persist watermark");
            }
        }

        counter!("relay_cycles_total").increment(1);
        counter!("relay_items_dispatched_total").increment(dispatched as u64);
        gauge!("relay_watermark").set(next as f64);
        gauge!("relay_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

        CycleReport {
            fetched: true,
            seen: items.len(),
            dispatched,
            watermark: next,
        }
    }
}

/// Normalized delivery timestamp: UTC, microsecond precision, `Z` suffix.
pub fn format_iso8601(dt: OffsetDateTime) -> String {
    static FORMAT: &[time::format_description::FormatItem<'static>] = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
    );
    let utc = dt.to_offset(UtcOffset::UTC);
    utc.format(FORMAT).unwrap_or_else(|_| utc.to_string())
}
