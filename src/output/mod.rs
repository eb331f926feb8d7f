//! Output artifacts: CSV, Markdown and the HTML table used in the mail body.
//! All renderers are pure functions of an already ranked list.

pub mod csv;
pub mod html;
pub mod markdown;

use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUT_DIR: &str = "out";

/// Timestamp format used in every artifact, e.g. `2025-10-14 08:30 CEST`.
pub fn format_timestamp(dt: &DateTime<Tz>) -> String {
    dt.format("%Y-%m-%d %H:%M %Z").to_string()
}

/// Run date tag used in file names and the mail subject.
pub fn date_tag(run_dt: &DateTime<Tz>) -> String {
    run_dt.format("%Y-%m-%d").to_string()
}

/// Paths of the date-tagged artifacts of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestPaths {
    pub csv: PathBuf,
    pub markdown: PathBuf,
}

impl DigestPaths {
    pub fn new(out_dir: &Path, run_dt: &DateTime<Tz>) -> Self {
        let tag = date_tag(run_dt);
        Self {
            csv: out_dir.join(format!("digest_{tag}.csv")),
            markdown: out_dir.join(format!("digest_{tag}.md")),
        }
    }
}

pub fn ensure_out_dir(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output dir {}", out_dir.display()))
}
