//! CSV artifact with fixed columns, RFC 4180 quoting.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::format_timestamp;
use crate::ingest::types::NewsItem;

pub const CSV_HEADER: [&str; 8] = [
    "region", "published", "score", "title", "source", "host", "url", "summary",
];

/// Quote a field if it contains a delimiter, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    let row: Vec<String> = fields.iter().map(|f| escape_field(f.as_ref())).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

pub fn render_csv(items: &[NewsItem]) -> String {
    let mut out = String::new();
    push_row(&mut out, &CSV_HEADER);
    for it in items {
        push_row(
            &mut out,
            &[
                it.region.to_string(),
                format_timestamp(&it.published),
                it.score.to_string(),
                it.title.clone(),
                it.source.clone(),
                it.host.clone(),
                it.url.clone(),
                it.summary.clone(),
            ],
        );
    }
    out
}

pub fn write_csv(items: &[NewsItem], path: &Path) -> Result<()> {
    fs::write(path, render_csv(items)).with_context(|| format!("writing {}", path.display()))
}
