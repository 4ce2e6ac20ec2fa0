// src/feed/parse.rs
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

// Serde mirror of the feed document. quick-xml strips namespace prefixes from
// element names, so the Media RSS children are addressed by local name.
#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "content")]
    media: Option<MediaContent>,
}

#[derive(Debug, Deserialize)]
struct MediaContent {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "description")]
    description: Option<MediaDescription>,
}

#[derive(Debug, Deserialize)]
struct MediaDescription {
    #[serde(rename = "$text")]
    text: Option<String>,
}

/// One feed entry, immutable once parsed.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub link: String,
    pub image_url: String,
    pub published_at: OffsetDateTime,
}

impl FeedItem {
    /// Unix seconds, clamped to 0 for pre-epoch dates.
    pub fn published_unix(&self) -> u64 {
        let secs = self
            .published_at
            .to_offset(UtcOffset::UTC)
            .unix_timestamp();
        u64::try_from(secs).unwrap_or(0)
    }
}

/// Parse repaired feed XML into items in document order (feeds list newest
/// first). Never fails the cycle: a document-level parse error logs and yields
/// an empty vec; an item with an unparseable `pubDate` is skipped with a
/// warning.
pub fn parse_feed(xml: &str) -> Vec<FeedItem> {
    let t0 = std::time::Instant::now();
    let rss: Rss = match from_str(xml) {
        Ok(rss) => rss,
        Err(e) => {
            tracing::warn!(error = %e, "feed parse failed, treating as empty");
            counter!("relay_parse_errors_total").increment(1);
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let Some(raw_date) = it.pub_date.as_deref() else {
            tracing::warn!(title = ?it.title, "item without pubDate skipped");
            continue;
        };
        let published_at = match OffsetDateTime::parse(raw_date, &Rfc2822) {
            Ok(dt) => dt,
            Err(e) => {
                tracing::warn!(error = %e, pub_date = raw_date, "bad pubDate, item skipped");
                continue;
            }
        };

        let (image_url, description) = match it.media {
            Some(media) => (
                media.url.unwrap_or_default(),
                media
                    .description
                    .and_then(|d| d.text)
                    .unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };

        out.push(FeedItem {
            title: it.title.unwrap_or_default(),
            description,
            link: it.link.unwrap_or_default(),
            image_url,
            published_at,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("relay_parse_ms").record(ms);
    counter!("relay_items_seen_total").increment(out.len() as u64);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Addons</title>
    <item>
      <title>Second release</title>
      <link>https://example.org/addons/2</link>
      <pubDate>Tue, 02 Jan 2024 12:00:00 +0000</pubDate>
      <media:content url="https://example.org/img/2.png">
        <media:description type="plain">Newer addon</media:description>
      </media:content>
    </item>
    <item>
      <title>First release</title>
      <link>https://example.org/addons/1</link>
      <pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate>
      <media:content url="https://example.org/img/1.png">
        <media:description type="plain">Older addon</media:description>
      </media:content>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn items_come_back_in_document_order() {
        let items = parse_feed(FEED);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Second release");
        assert_eq!(items[1].title, "First release");
        assert!(items[0].published_unix() > items[1].published_unix());
    }

    #[test]
    fn media_fields_are_extracted() {
        let items = parse_feed(FEED);
        assert_eq!(items[0].image_url, "https://example.org/img/2.png");
        assert_eq!(items[0].description, "Newer addon");
        assert_eq!(items[0].link, "https://example.org/addons/2");
    }

    #[test]
    fn missing_media_defaults_to_empty_strings() {
        let xml = r#"<rss version="2.0"><channel><item>
            <title>No media</title>
            <link>https://example.org/x</link>
            <pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate>
        </item></channel></rss>"#;
        let items = parse_feed(xml);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].image_url, "");
        assert_eq!(items[0].description, "");
    }

    #[test]
    fn bad_pub_date_skips_only_that_item() {
        let xml = r#"<rss version="2.0"><channel>
          <item><title>Bad</title><pubDate>yesterday-ish</pubDate></item>
          <item><title>Good</title><pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate></item>
        </channel></rss>"#;
        let items = parse_feed(xml);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Good");
    }

    #[test]
    fn malformed_document_yields_empty() {
        assert!(parse_feed("<rss><channel><item></rss>").is_empty());
        assert!(parse_feed("not xml at all").is_empty());
    }

    #[test]
    fn offset_dates_convert_to_utc_seconds() {
        let xml = r#"<rss version="2.0"><channel>
          <item><title>Offset</title><pubDate>Mon, 01 Jan 2024 13:00:00 +0100</pubDate></item>
        </channel></rss>"#;
        let items = parse_feed(xml);
        // 12:00 UTC
        assert_eq!(items[0].published_unix(), 1_704_110_400);
    }
}
