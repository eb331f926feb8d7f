// src/ingest/providers/rss.rs
//! RSS 2.0 / RSS 1.0 / Atom parsing and the HTTP feed fetcher.
//!
//! The parser walks quick-xml events instead of deserializing into structs:
//! item children are matched by prefix and local name, so namespaced siblings
//! (`atom:link`, `media:title`, `content:encoded`) never collide with the plain
//! RSS fields. Text is unescaped with the full HTML5 entity table.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use reqwest::Client;
use std::time::Duration;

use crate::ingest::types::{FeedFetcher, RawEntry};

const USER_AGENT: &str = concat!("daily-digest/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Summary,
    Content,
    Published,
    Updated,
    Created,
}

/// `(prefix, local name)` of a qualified name.
fn split_name(name: QName<'_>) -> (Option<&[u8]>, &[u8]) {
    let raw = name.0;
    match raw.iter().position(|&b| b == b':') {
        Some(i) => (Some(&raw[..i]), &raw[i + 1..]),
        None => (None, raw),
    }
}

/// Item/entry children we read. Unknown and foreign-namespace elements are skipped.
fn field_for(name: QName) -> Option<Field> {
    match split_name(name) {
        (None, b"title") => Some(Field::Title),
        (None, b"link") => Some(Field::Link),
        (None, b"description") | (None, b"summary") => Some(Field::Summary),
        (None, b"content") => Some(Field::Content),
        (None, b"pubDate") | (None, b"published") => Some(Field::Published),
        (None, b"updated") => Some(Field::Updated),
        (Some(b"dc"), b"date") => Some(Field::Created),
        _ => None,
    }
}

fn is_entry(name: QName) -> bool {
    matches!(split_name(name), (None, b"item") | (None, b"entry"))
}

fn check_root(start: &BytesStart) -> Result<()> {
    match split_name(start.name()).1 {
        b"rss" | b"RDF" | b"feed" => Ok(()),
        other => bail!(
            "unsupported feed root <{}>",
            String::from_utf8_lossy(other)
        ),
    }
}

fn attr(start: &BytesStart, key: &[u8]) -> Option<String> {
    let a = start.try_get_attribute(key).ok().flatten()?;
    Some(match a.unescape_value() {
        Ok(v) => v.into_owned(),
        Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
    })
}

// Unknown entities are not fatal: fall back to a lenient HTML decode.
fn text_of(t: &BytesText) -> String {
    match t.unescape() {
        Ok(s) => s.into_owned(),
        Err(_) => html_escape::decode_html_entities(&String::from_utf8_lossy(t)).into_owned(),
    }
}

#[derive(Debug, Default)]
struct PartialEntry {
    title: Option<String>,
    link: Option<String>,
    alternate: Option<String>,
    other_href: Option<String>,
    summary: Option<String>,
    content: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    created: Option<String>,
}

impl PartialEntry {
    /// First non-blank value wins.
    fn set(&mut self, field: Field, text: String) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
            Field::Created => &mut self.created,
        };
        if slot.is_none() {
            *slot = Some(text.to_string());
        }
    }

    // Atom `<link href>`; a missing rel means "alternate".
    fn add_href(&mut self, start: &BytesStart) {
        let Some(href) = attr(start, b"href").filter(|h| !h.trim().is_empty()) else {
            return;
        };
        let alternate = attr(start, b"rel").map_or(true, |r| r == "alternate");
        let slot = if alternate {
            &mut self.alternate
        } else {
            &mut self.other_href
        };
        if slot.is_none() {
            *slot = Some(href.trim().to_string());
        }
    }

    fn into_raw(self) -> RawEntry {
        RawEntry {
            link: self.link.or(self.alternate).or(self.other_href),
            title: self.title,
            summary: self.summary.or(self.content),
            published: self.published,
            updated: self.updated,
            created: self.created,
            ..Default::default()
        }
    }
}

struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

/// Parse an RSS or Atom document into raw entries.
pub fn parse_feed(xml: &str) -> Result<Vec<RawEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut root_seen = false;
    let mut entry: Option<(usize, PartialEntry)> = None;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event().context("reading feed xml")? {
            Event::Start(e) => {
                depth += 1;
                if !root_seen {
                    check_root(&e)?;
                    root_seen = true;
                    continue;
                }
                // markup inside a captured field (xhtml title, html description)
                if capture.is_some() {
                    continue;
                }
                match entry.as_mut() {
                    None => {
                        if is_entry(e.name()) {
                            entry = Some((depth, PartialEntry::default()));
                        }
                    }
                    Some((entry_depth, partial)) if depth == *entry_depth + 1 => {
                        if let Some(field) = field_for(e.name()) {
                            if field == Field::Link {
                                partial.add_href(&e);
                            }
                            capture = Some(Capture {
                                field,
                                depth,
                                text: String::new(),
                            });
                        }
                    }
                    Some(_) => {}
                }
            }
            Event::Empty(e) => {
                if !root_seen {
                    check_root(&e)?;
                    root_seen = true;
                    continue;
                }
                if let Some((entry_depth, partial)) = entry.as_mut() {
                    if capture.is_none()
                        && depth == *entry_depth
                        && field_for(e.name()) == Some(Field::Link)
                    {
                        partial.add_href(&e);
                    }
                }
            }
            Event::Text(t) => {
                if let Some(c) = capture.as_mut() {
                    c.text.push_str(&text_of(&t));
                }
            }
            Event::CData(t) => {
                if let Some(c) = capture.as_mut() {
                    c.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(_) => {
                if capture.as_ref().is_some_and(|c| c.depth == depth) {
                    if let (Some(c), Some((_, partial))) = (capture.take(), entry.as_mut()) {
                        partial.set(c.field, c.text);
                    }
                }
                if entry.as_ref().is_some_and(|(d, _)| *d == depth) {
                    if let Some((_, partial)) = entry.take() {
                        entries.push(partial.into_raw());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        bail!("no rss or atom root element");
    }
    Ok(entries)
}

/// Fetches a feed over HTTP with a bounded timeout and parses it.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>> {
        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                counter!("ingest_http_errors_total").increment(1);
                return Err(e).context("feed http get()");
            }
        };
        let status = resp.status();
        if !status.is_success() {
            counter!("ingest_http_errors_total").increment(1);
            return Err(anyhow!("feed returned HTTP {status}"));
        }
        let body = resp.text().await.context("feed http .text()")?;
        parse_feed(&body)
    }
}
