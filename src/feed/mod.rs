// src/feed/mod.rs
pub mod fetch;
pub mod parse;
pub mod repair;

pub use fetch::{FeedSource, HttpFeedSource};
pub use parse::{parse_feed, FeedItem};
pub use repair::repair_named_entities;
