// src/notify/template.rs
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::feed::FeedItem;

/// JSON message template with `$name` / `${name}` placeholders. Loaded once at
/// startup; the file's shape (Discord embed, Slack block, ...) is entirely the
/// operator's business — the relay only substitutes item fields and parses the
/// result.
#[derive(Clone)]
pub struct MessageTemplate {
    raw: String,
}

impl MessageTemplate {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading message template from {}", path.display()))?;
        Ok(Self { raw })
    }

    pub fn from_raw(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
        }
    }

    /// Substitute item fields and parse the result as JSON. The description has
    /// newlines collapsed to spaces and double quotes escaped so it can sit
    /// inside a JSON string field; everything else is inserted verbatim.
    pub fn render(&self, item: &FeedItem, timestamp_iso: &str) -> Result<Value> {
        let safe_desc = item.description.replace('\n', " ").replace('"', "\\\"");

        let mut vars: HashMap<&str, &str> = HashMap::new();
        vars.insert("title", item.title.as_str());
        vars.insert("description", safe_desc.as_str());
        vars.insert("timestamp", timestamp_iso);
        vars.insert("url", item.link.as_str());
        vars.insert("image_url", item.image_url.as_str());

        let body = substitute(&self.raw, &vars);
        serde_json::from_str(&body).context("rendered message template is not valid JSON")
    }
}

fn substitute(template: &str, vars: &HashMap<&str, &str>) -> String {
    static RE_PLACEHOLDER: OnceCell<Regex> = OnceCell::new();
    let re = RE_PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))").unwrap()
    });

    re.replace_all(template, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or("");
        match vars.get(name) {
            Some(v) => (*v).to_string(),
            // Unknown placeholder: leave the literal text in place.
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}
