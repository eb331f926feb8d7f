//! Markdown digest grouped by region.

use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use std::fs;
use std::path::Path;

use super::format_timestamp;
use crate::ingest::types::NewsItem;
use crate::ranking::by_score_then_recency;
use crate::region::Region;

pub const DIGEST_TITLE: &str = "Daily Digest – Banking, Finance & Crypto (DACH & MENA)";

pub fn render_markdown(items: &[NewsItem], run_dt: &DateTime<Tz>) -> String {
    let mut lines = vec![
        format!("# {DIGEST_TITLE}\n"),
        format!("_Stand: {}_\n", format_timestamp(run_dt)),
    ];

    for region in Region::ALL {
        let mut group: Vec<&NewsItem> = items.iter().filter(|it| it.region == region).collect();
        if group.is_empty() {
            continue;
        }
        lines.push(format!("\n## {region}\n"));
        group.sort_by(|a, b| by_score_then_recency(a, b));
        for it in group {
            lines.push(format!(
                "- **[{}]({})**  \n  {}  \n  _{} · {} · {} · Score {}_",
                it.title,
                it.url,
                it.summary,
                it.source,
                it.host,
                format_timestamp(&it.published),
                it.score
            ));
        }
    }

    lines.join("\n")
}

pub fn write_markdown(items: &[NewsItem], run_dt: &DateTime<Tz>, path: &Path) -> Result<()> {
    fs::write(path, render_markdown(items, run_dt))
        .with_context(|| format!("writing {}", path.display()))
}
