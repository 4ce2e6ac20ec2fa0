//! feed-relay — Binary Entrypoint
//! Polls a single RSS feed on a fixed interval and relays new items to the
//! configured webhook endpoints. See `README.md` for setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feed_relay::{build_relay, scheduler, Config};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feed_relay=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Config::load_default()?;
    tracing::info!(
        feed = %cfg.rss_feed.url,
        sinks = cfg.webhook.urls.len(),
        interval_mins = cfg.schedule.interval,
        "starting feed relay"
    );

    let relay = build_relay(&cfg)?;
    scheduler::run(relay, cfg.interval()).await;
    Ok(())
}
