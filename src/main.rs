//! Daily Digest — Binary Entrypoint
//! One run: fetch every catalog feed, rank per region, write CSV + Markdown
//! into the out dir and mail the digest when SMTP settings are present.

use anyhow::Result;
use chrono::Utc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use daily_digest::config::AppConfig;
use daily_digest::digest::{DigestOutcome, DigestRunner};
use daily_digest::ingest::dates::DIGEST_TZ;
use daily_digest::ingest::providers::HttpFeedFetcher;
use daily_digest::notify::MailConfig;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("daily_digest=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present; real env vars win.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env();
    tracing::info!(?cfg, "starting digest run");

    let runner = DigestRunner::from_config(&cfg)?;
    let fetcher = HttpFeedFetcher::new(cfg.fetch_timeout)?;
    let mail = MailConfig::from_env();

    let now = Utc::now().with_timezone(&DIGEST_TZ);
    match runner.run(&fetcher, mail.as_ref(), now).await? {
        DigestOutcome::Empty { stats } => {
            tracing::info!(?stats, "no items in window");
            println!("Keine Items gefunden.");
        }
        DigestOutcome::Written {
            stats,
            picked,
            paths,
            mail,
        } => {
            tracing::info!(?stats, picked = picked.len(), ?mail, "digest written");
            println!(
                "Fertig. {} Items -> {} / {}",
                picked.len(),
                paths.csv.display(),
                paths.markdown.display()
            );
        }
    }
    Ok(())
}
