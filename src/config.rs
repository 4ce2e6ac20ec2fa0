// src/config.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const ENV_PATH: &str = "FEED_RELAY_CONFIG";
const DEFAULT_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub schedule: ScheduleCfg,
    pub rss_feed: RssFeedCfg,
    pub webhook: WebhookCfg,
    #[serde(default)]
    pub state: StateCfg,
    #[serde(default)]
    pub message: MessageCfg,
    #[serde(default)]
    pub http: HttpCfg,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleCfg {
    /// Polling interval in minutes.
    pub interval: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RssFeedCfg {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookCfg {
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateCfg {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageCfg {
    #[serde(default = "default_template_path")]
    pub template: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpCfg {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("last_update.txt")
}

fn default_template_path() -> PathBuf {
    PathBuf::from("message.json")
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for StateCfg {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

impl Default for MessageCfg {
    fn default() -> Self {
        Self {
            template: default_template_path(),
        }
    }
}

impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        // A zero period would panic the interval timer deep in the scheduler;
        // reject it up front with a readable message.
        if self.schedule.interval == 0 {
            anyhow::bail!("schedule.interval must be at least 1 minute");
        }
        Ok(())
    }

    /// Load from $FEED_RELAY_CONFIG, falling back to ./config.toml.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(ENV_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PATH));
        Self::load_from(&path)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.schedule.interval * 60)
    }
}
