//! One digest run: fetch → normalize → rank → write files → mail.

use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, FeedSource};
use crate::config::AppConfig;
use crate::ingest::types::{FeedFetcher, NewsItem};
use crate::ingest::{IngestStats, Pipeline};
use crate::notify::{send_email, DigestEmail, MailAttachment, MailConfig, MailStatus};
use crate::output::csv::write_csv;
use crate::output::html::html_body;
use crate::output::markdown::write_markdown;
use crate::output::{date_tag, ensure_out_dir, DigestPaths};
use crate::ranking::pick_top;
use crate::relevance::{Scorer, ScoringRules};
use crate::source_weights::SourceWeights;

/// Plain-text alternative; points at the directory the files were written to.
pub fn text_body(out_dir: &Path) -> String {
    format!(
        "Täglicher Digest im Anhang (CSV) bzw. als Markdown in {}/.\n",
        out_dir.display()
    )
}

#[derive(Debug)]
pub enum DigestOutcome {
    /// Nothing survived dedup and the time window; no files, no mail.
    Empty { stats: IngestStats },
    Written {
        stats: IngestStats,
        picked: Vec<NewsItem>,
        paths: DigestPaths,
        mail: MailStatus,
    },
}

/// Everything a run needs, resolved from `AppConfig`.
#[derive(Debug)]
pub struct DigestRunner {
    pub feeds: Vec<FeedSource>,
    pub pipeline: Pipeline,
    pub top_n: usize,
    pub out_dir: PathBuf,
}

impl DigestRunner {
    /// Load catalog, scoring rules and source weights (override files or built-ins).
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let catalog = Catalog::load(cfg.feeds_path.as_deref())?;
        let rules = match &cfg.scoring_path {
            Some(p) => ScoringRules::load_from(p)?,
            None => ScoringRules::builtin(),
        };
        let weights = match &cfg.source_weights_path {
            Some(p) => SourceWeights::load_from_file(p),
            None => SourceWeights::default_seed(),
        };

        let pipeline = Pipeline::new(Scorer::new(rules).context("compiling scoring rules")?, weights)
            .with_hours_back(cfg.hours_back)
            .with_fetch_timeout(cfg.fetch_timeout);

        Ok(Self {
            feeds: catalog.expand(),
            pipeline,
            top_n: cfg.top_n,
            out_dir: cfg.out_dir.clone(),
        })
    }

    pub async fn run<F: FeedFetcher + ?Sized>(
        &self,
        fetcher: &F,
        mail: Option<&MailConfig>,
        now: DateTime<Tz>,
    ) -> Result<DigestOutcome> {
        let (items, stats) = self.pipeline.collect(fetcher, &self.feeds, now).await;
        if items.is_empty() {
            return Ok(DigestOutcome::Empty { stats });
        }

        let picked = pick_top(items, self.top_n);
        let paths = write_artifacts(&picked, &self.out_dir, &now)?;

        let email = digest_email(&picked, &paths, &self.out_dir, &now);
        let mail = match send_email(mail, &email).await {
            Ok(status) => status,
            // files are written already; a failed delivery does not fail the run
            Err(e) => {
                tracing::error!(error = ?e, "digest mail failed");
                MailStatus::Failed
            }
        };

        Ok(DigestOutcome::Written {
            stats,
            picked,
            paths,
            mail,
        })
    }
}

pub fn write_artifacts(picked: &[NewsItem], out_dir: &Path, run_dt: &DateTime<Tz>) -> Result<DigestPaths> {
    ensure_out_dir(out_dir)?;
    let paths = DigestPaths::new(out_dir, run_dt);
    write_csv(picked, &paths.csv)?;
    write_markdown(picked, run_dt, &paths.markdown)?;
    Ok(paths)
}

pub fn digest_subject(run_dt: &DateTime<Tz>) -> String {
    format!(
        "Daily Digest – Banking/Finance/Crypto (DACH & MENA) – {}",
        date_tag(run_dt)
    )
}

pub fn digest_email(
    picked: &[NewsItem],
    paths: &DigestPaths,
    out_dir: &Path,
    run_dt: &DateTime<Tz>,
) -> DigestEmail {
    DigestEmail {
        subject: digest_subject(run_dt),
        html_body: html_body(picked),
        text_body: text_body(out_dir),
        attachments: vec![MailAttachment {
            path: paths.csv.clone(),
            mime: "text/csv".to_string(),
        }],
    }
}
