//! Feed catalog: static feeds plus Google News search queries.
//!
//! `Catalog::expand()` flattens both into `FeedSource`s. Query feeds are
//! tagged `broad`, which makes the normalizer classify their items by URL
//! instead of trusting the region hint.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use url::form_urlencoded;

use crate::region::Region;

pub const ENV_FEEDS_PATH: &str = "DIGEST_FEEDS_PATH";

const GOOGLE_NEWS_SEARCH: &str = "https://news.google.com/rss/search";

/// A feed to fetch, with the region it is expected to cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub region_hint: Region,
    pub name: String,
    pub url: String,
    /// Broad or regulator search query; its items are re-classified by URL.
    pub broad: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StaticFeed {
    pub region: Region,
    pub name: String,
    pub url: String,
}

/// Parameterized Google News search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryTemplate {
    pub region: Region,
    pub name: String,
    pub q: String,
    pub hl: String,
    pub gl: String,
    pub ceid: String,
}

impl QueryTemplate {
    pub fn url(&self) -> String {
        google_news_url(&self.q, &self.hl, &self.gl, &self.ceid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub feeds: Vec<StaticFeed>,
    #[serde(default)]
    pub queries: Vec<QueryTemplate>,
}

/// Google News RSS search URL; the query is form-encoded (spaces become `+`).
pub fn google_news_url(q: &str, hl: &str, gl: &str, ceid: &str) -> String {
    let q: String = form_urlencoded::byte_serialize(q.as_bytes()).collect();
    format!("{GOOGLE_NEWS_SEARCH}?q={q}&hl={hl}&gl={gl}&ceid={ceid}")
}

impl Catalog {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing feed catalog toml")
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feed catalog from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Catalog override file if given, otherwise the built-in catalog.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => Ok(Self::builtin()),
        }
    }

    /// Static feeds first, then query feeds, both in declaration order.
    pub fn expand(&self) -> Vec<FeedSource> {
        let statics = self.feeds.iter().map(|f| FeedSource {
            region_hint: f.region,
            name: f.name.clone(),
            url: f.url.clone(),
            broad: false,
        });
        let queries = self.queries.iter().map(|q| FeedSource {
            region_hint: q.region,
            name: q.name.clone(),
            url: q.url(),
            broad: true,
        });
        statics.chain(queries).collect()
    }

    pub fn builtin() -> Self {
        fn feed(region: Region, name: &str, url: &str) -> StaticFeed {
            StaticFeed {
                region,
                name: name.to_string(),
                url: url.to_string(),
            }
        }
        fn query(region: Region, name: &str, q: &str, hl: &str, gl: &str, ceid: &str) -> QueryTemplate {
            QueryTemplate {
                region,
                name: name.to_string(),
                q: q.to_string(),
                hl: hl.to_string(),
                gl: gl.to_string(),
                ceid: ceid.to_string(),
            }
        }

        let feeds = vec![
            // DACH business & finance
            feed(Region::Dach, "Handelsblatt", "https://www.handelsblatt.com/contentexport/feed/rss"),
            feed(Region::Dach, "WirtschaftsWoche", "https://www.wiwo.de/contentexport/feed/rss/schlagzeilen"),
            feed(Region::Dach, "FAZ Finanzen", "https://www.faz.net/rss/aktuell/finanzen/"),
            feed(Region::Dach, "ARD Börse", "https://www.tagesschau.de/wirtschaft/boerse/index~rss2.xml"),
            feed(Region::Dach, "NZZ Wirtschaft", "https://www.nzz.ch/wirtschaft.rss"),
            feed(Region::Dach, "Der Standard Wirtschaft", "https://www.derstandard.at/rss/wirtschaft"),
            feed(Region::Dach, "Manager Magazin", "https://www.manager-magazin.de/finanzen/index.rss"),
            feed(Region::Dach, "SwissInfo Business", "https://www.swissinfo.ch/eng/business/rss"),
            // Global crypto
            feed(Region::Global, "CoinDesk", "https://www.coindesk.com/arc/outboundfeeds/rss/"),
            feed(Region::Global, "CoinTelegraph", "https://cointelegraph.com/rss"),
            feed(Region::Global, "Bitcoin Magazine", "https://bitcoinmagazine.com/.rss/full/"),
        ];

        let queries = vec![
            query(
                Region::Dach,
                "Google News DACH (de)",
                "Bank OR Fintech OR Zahlungsverkehr OR Krypto OR Blockchain OR Bitcoin OR Ethereum OR CBDC OR Regulator OR BaFin OR FINMA",
                "de", "DE", "DE:de",
            ),
            query(
                Region::Dach,
                "DACH Regulators (de)",
                "site:bafin.de OR site:finma.ch OR site:bundesbank.de OR site:snb.ch OR site:oenb.at OR site:ecb.europa.eu",
                "de", "DE", "DE:de",
            ),
            query(
                Region::Dach,
                "DACH Regulators (en)",
                "site:finma.ch OR site:bundesbank.de OR site:snb.ch OR site:oenb.at OR site:ecb.europa.eu",
                "en", "DE", "DE:en",
            ),
            query(
                Region::Mena,
                "Google News MENA (en)",
                "bank OR fintech OR crypto OR blockchain OR CBDC OR payments OR regulator OR central bank (site:ae OR site:sa OR site:eg OR site:bh OR site:om OR site:qa OR site:kw)",
                "en", "AE", "AE:en",
            ),
            query(
                Region::Mena,
                "Google News MENA (ar)",
                "بنك OR تمويل OR فينتك OR تشفير OR بلوكتشين OR المدفوعات OR عملة رقمية",
                "ar", "SA", "SA:ar",
            ),
            query(
                Region::Mena,
                "GCC Regulators (en)",
                "site:sama.gov.sa OR site:cbuae.gov.ae OR site:qcb.gov.qa OR site:cbe.org.eg OR site:cma.org.sa OR site:dfsa.ae OR site:adgm.com OR site:vara.ae",
                "en", "AE", "AE:en",
            ),
        ];

        Self { feeds, queries }
    }
}
