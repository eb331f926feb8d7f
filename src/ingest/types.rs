// src/ingest/types.rs
use anyhow::Result;
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::region::Region;

/// One entry as yielded by a feed parser. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub link: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub created: Option<String>,
    /// Structured timestamps as unix seconds (UTC).
    pub published_parsed: Option<i64>,
    pub updated_parsed: Option<i64>,
}

/// A scored, deduplicated news item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String, // at most two sentences
    pub url: String,     // canonical
    pub source: String,  // feed name
    pub host: String,    // registrable domain
    pub region: Region,
    pub score: f64, // rounded to 3 decimals
    pub published: DateTime<Tz>,
}

#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>>;
}
