// tests/common/mod.rs
// Shared fixtures: a canned fetcher and item/entry builders.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::time::Duration;

use daily_digest::catalog::FeedSource;
use daily_digest::ingest::dates::DIGEST_TZ;
use daily_digest::ingest::types::{FeedFetcher, NewsItem, RawEntry};
use daily_digest::region::Region;

/// Fixed run time: 2025-10-14 10:00 Europe/Berlin.
pub fn run_time() -> DateTime<Tz> {
    DIGEST_TZ.with_ymd_and_hms(2025, 10, 14, 10, 0, 0).unwrap()
}

pub enum Canned {
    Entries(Vec<RawEntry>),
    Fail,
    Slow(Duration),
}

/// Serves canned responses keyed by feed URL. Unknown URLs yield no entries.
#[derive(Default)]
pub struct StubFetcher {
    responses: HashMap<String, Canned>,
}

impl StubFetcher {
    pub fn with(mut self, url: &str, canned: Canned) -> Self {
        self.responses.insert(url.to_string(), canned);
        self
    }
}

#[async_trait]
impl FeedFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>> {
        match self.responses.get(url) {
            Some(Canned::Entries(e)) => Ok(e.clone()),
            Some(Canned::Fail) => Err(anyhow!("connection refused")),
            Some(Canned::Slow(d)) => {
                tokio::time::sleep(*d).await;
                Ok(vec![entry("https://slow.example.com/a", "late", "", run_time())])
            }
            None => Ok(Vec::new()),
        }
    }
}

pub fn feed(region: Region, name: &str, url: &str) -> FeedSource {
    FeedSource {
        region_hint: region,
        name: name.to_string(),
        url: url.to_string(),
        broad: false,
    }
}

pub fn entry(link: &str, title: &str, summary: &str, published: DateTime<Tz>) -> RawEntry {
    RawEntry {
        link: Some(link.to_string()),
        title: Some(title.to_string()),
        summary: Some(summary.to_string()),
        published: Some(published.to_rfc3339()),
        ..Default::default()
    }
}

pub fn item(region: Region, score: f64, published: DateTime<Tz>, url: &str) -> NewsItem {
    NewsItem {
        title: format!("Title {url}"),
        summary: "Kurz.".into(),
        url: url.to_string(),
        source: "Test".into(),
        host: "example.com".into(),
        region,
        score,
        published,
    }
}
