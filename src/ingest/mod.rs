// src/ingest/mod.rs
pub mod dates;
pub mod providers;
pub mod types;

use crate::catalog::FeedSource;
use crate::ingest::types::{FeedFetcher, NewsItem, RawEntry};
use crate::region::{guess_region_from_url, registrable_domain, Region};
use crate::relevance::{scoring_text, Scorer};
use crate::source_weights::SourceWeights;
use chrono::{DateTime, Duration as ChronoDuration};
use chrono_tz::Tz;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::collections::HashSet;
use std::time::{Duration, Instant};

pub const DEFAULT_HOURS_BACK: i64 = 48;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);
pub const SUMMARY_MAX_SENTENCES: usize = 2;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_entries_total", "Raw entries seen across all feeds.");
        describe_counter!("ingest_kept_total", "Items kept after dedup and window filter.");
        describe_counter!("ingest_dedup_total", "Entries dropped as duplicate URLs.");
        describe_counter!(
            "ingest_window_dropped_total",
            "Entries dropped for falling outside the lookback window."
        );
        describe_counter!(
            "ingest_feed_errors_total",
            "Feed fetch/parse errors and timeouts."
        );
        describe_histogram!("ingest_fetch_ms", "Feed fetch + parse time in milliseconds.");
    });
}

static RE_UTM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([?&])(utm_[^=]+=[^&]+)&?").expect("utm regex"));
static RE_SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence regex"));

/// Canonical form of a link: trimmed, every `utm_*` parameter removed and no
/// trailing `?` or `&`.
pub fn normalize_url(url: &str) -> String {
    let mut out = url.trim().to_string();
    // A removal can expose the next utm_ pair to the separator it consumed.
    loop {
        let next = RE_UTM.replace_all(&out, "${1}").into_owned();
        if next == out {
            break;
        }
        out = next;
    }
    out.trim_end_matches(['?', '&']).to_string()
}

/// Stable identity of a canonical URL (hex SHA-256).
pub fn url_identity(canonical_url: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(canonical_url.as_bytes());
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Decode HTML entities and trim.
pub fn decode_text(s: &str) -> String {
    html_escape::decode_html_entities(s).trim().to_string()
}

/// First `max_sentences` sentences of `teaser`, joined by single spaces.
/// A sentence ends at `.`, `!` or `?` followed by whitespace.
pub fn summarize(teaser: &str, max_sentences: usize) -> String {
    let t = teaser.trim();
    if t.is_empty() || max_sentences == 0 {
        return String::new();
    }
    let mut sentences = Vec::with_capacity(max_sentences);
    let mut start = 0;
    for m in RE_SENTENCE_END.find_iter(t) {
        if sentences.len() == max_sentences {
            break;
        }
        // keep the punctuation, drop the whitespace
        sentences.push(&t[start..m.start() + 1]);
        start = m.end();
    }
    if sentences.len() < max_sentences && start < t.len() {
        sentences.push(&t[start..]);
    }
    sentences.join(" ").trim().to_string()
}

/// Explicit regional feeds are trusted; GLOBAL and broad search feeds are
/// classified by the item URL.
pub fn resolve_region(feed: &FeedSource, url: &str) -> Region {
    if feed.region_hint == Region::Global || feed.broad {
        guess_region_from_url(url)
    } else {
        feed.region_hint
    }
}

pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Counters for one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub feeds_ok: usize,
    pub feeds_failed: usize,
    pub entries: usize,
    pub no_link: usize,
    pub duplicates: usize,
    pub out_of_window: usize,
    pub kept: usize,
}

/// Normalization, dedup and scoring over a set of feeds.
/// The scoring rules and reputation table are injected.
#[derive(Debug)]
pub struct Pipeline {
    pub scorer: Scorer,
    pub weights: SourceWeights,
    pub hours_back: i64,
    pub fetch_timeout: Duration,
}

/// Dedup state for one run.
#[derive(Debug, Default)]
pub struct SeenUrls(HashSet<String>);

impl SeenUrls {
    /// Returns `true` if the identity was not seen before.
    pub fn insert(&mut self, canonical_url: &str) -> bool {
        self.0.insert(url_identity(canonical_url))
    }
}

impl Pipeline {
    pub fn new(scorer: Scorer, weights: SourceWeights) -> Self {
        Self {
            scorer,
            weights,
            hours_back: DEFAULT_HOURS_BACK,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_hours_back(mut self, hours: i64) -> Self {
        self.hours_back = hours;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Fetch every feed sequentially and normalize its entries.
    /// A failing or timed-out feed contributes nothing.
    pub async fn collect<F: FeedFetcher + ?Sized>(
        &self,
        fetcher: &F,
        feeds: &[FeedSource],
        now: DateTime<Tz>,
    ) -> (Vec<NewsItem>, IngestStats) {
        ensure_metrics_described();

        let mut seen = SeenUrls::default();
        let mut stats = IngestStats::default();
        let mut items = Vec::new();

        for feed in feeds {
            let t0 = Instant::now();
            let fetched = tokio::time::timeout(self.fetch_timeout, fetcher.fetch(&feed.url)).await;
            histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

            let entries = match fetched {
                Ok(Ok(entries)) => entries,
                Ok(Err(e)) => {
                    tracing::warn!(error = ?e, feed = %feed.name, "feed unreadable");
                    counter!("ingest_feed_errors_total").increment(1);
                    stats.feeds_failed += 1;
                    continue;
                }
                Err(_) => {
                    tracing::warn!(
                        feed = %feed.name,
                        timeout_secs = self.fetch_timeout.as_secs_f64(),
                        "feed timed out"
                    );
                    counter!("ingest_feed_errors_total").increment(1);
                    stats.feeds_failed += 1;
                    continue;
                }
            };

            stats.feeds_ok += 1;
            let before = items.len();
            items.extend(self.normalize_entries(feed, entries, now, &mut seen, &mut stats));
            tracing::debug!(feed = %feed.name, kept = items.len() - before, "feed processed");
        }

        counter!("ingest_entries_total").increment(stats.entries as u64);
        counter!("ingest_dedup_total").increment(stats.duplicates as u64);
        counter!("ingest_window_dropped_total").increment(stats.out_of_window as u64);
        counter!("ingest_kept_total").increment(stats.kept as u64);

        tracing::info!(
            feeds_ok = stats.feeds_ok,
            feeds_failed = stats.feeds_failed,
            entries = stats.entries,
            duplicates = stats.duplicates,
            out_of_window = stats.out_of_window,
            kept = stats.kept,
            "ingest finished"
        );

        (items, stats)
    }

    /// Turn one feed's raw entries into news items, skipping entries without
    /// a link, duplicates of already seen URLs, and entries outside the window.
    pub fn normalize_entries(
        &self,
        feed: &FeedSource,
        entries: Vec<RawEntry>,
        now: DateTime<Tz>,
        seen: &mut SeenUrls,
        stats: &mut IngestStats,
    ) -> Vec<NewsItem> {
        // None: the window reaches past what chrono can represent, so no lower bound
        let cutoff = ChronoDuration::try_hours(self.hours_back).and_then(|d| now.checked_sub_signed(d));
        let mut out = Vec::with_capacity(entries.len());

        for entry in entries {
            stats.entries += 1;

            let url = normalize_url(entry.link.as_deref().unwrap_or_default());
            if url.is_empty() {
                stats.no_link += 1;
                continue;
            }

            // First occurrence wins, even if it later falls outside the window.
            if !seen.insert(&url) {
                stats.duplicates += 1;
                continue;
            }

            let title = decode_text(entry.title.as_deref().unwrap_or_default());
            let summary = decode_text(entry.summary.as_deref().unwrap_or_default());

            let published = dates::resolve_published(&entry, now);
            if cutoff.is_some_and(|c| published < c) || published > now {
                stats.out_of_window += 1;
                continue;
            }

            let region = resolve_region(feed, &url);
            let host = registrable_domain(&url);

            let raw = self.scorer.score(&scoring_text(&title, &summary, &feed.name));
            let score = raw
                * self.weights.weight_for_host(&host)
                * self.scorer.region_boost(region);

            out.push(NewsItem {
                title,
                summary: summarize(&summary, SUMMARY_MAX_SENTENCES),
                url,
                source: feed.name.clone(),
                host,
                region,
                score: round3(score),
                published,
            });
            stats.kept += 1;
        }

        out
    }
}
