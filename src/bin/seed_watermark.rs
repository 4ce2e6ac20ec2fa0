//! Operator tool: seed the watermark to the newest item currently in the feed,
//! so a fresh deployment does not burst-notify the whole backlog. Run once
//! before starting the relay for the first time.

use anyhow::{bail, Result};
use feed_relay::feed::{parse_feed, FeedSource, HttpFeedSource};
use feed_relay::watermark::{FileWatermarkStore, WatermarkStore};
use feed_relay::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().compact().init();

    let cfg = Config::load_default()?;
    let source = HttpFeedSource::new(cfg.rss_feed.url.clone(), cfg.http.timeout_secs)?;

    let Some(xml) = source.fetch().await else {
        bail!("feed fetch failed, watermark not seeded");
    };

    let newest = parse_feed(&xml)
        .iter()
        .map(|item| item.published_unix())
        .max();
    let Some(newest) = newest else {
        bail!("feed contained no parseable items, watermark not seeded");
    };

    let store = FileWatermarkStore::new(cfg.state.path.clone());
    store.save(newest).await?;
    println!("watermark seeded to {newest} ({})", cfg.state.path.display());
    Ok(())
}
