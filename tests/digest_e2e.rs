// tests/digest_e2e.rs
mod common;

use chrono::Duration as ChronoDuration;
use std::path::PathBuf;

use common::{entry, run_time, Canned, StubFetcher};
use daily_digest::config::AppConfig;
use daily_digest::digest::{digest_email, digest_subject, DigestOutcome, DigestRunner};
use daily_digest::notify::{MailConfig, MailStatus};
use daily_digest::region::Region;

const FEEDS: &str = r#"
[[feeds]]
region = "DACH"
name = "Finews"
url = "https://feeds.test/finews"

[[feeds]]
region = "MENA"
name = "VARA"
url = "https://feeds.test/vara"
"#;

fn runner(out_dir: PathBuf) -> DigestRunner {
    let dir = out_dir.parent().unwrap().to_path_buf();
    let feeds_path = dir.join("feeds.toml");
    std::fs::write(&feeds_path, FEEDS).unwrap();

    let cfg = AppConfig {
        out_dir,
        feeds_path: Some(feeds_path),
        ..AppConfig::default()
    };
    DigestRunner::from_config(&cfg).unwrap()
}

#[tokio::test]
async fn empty_run_writes_nothing_and_sends_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let r = runner(out.clone());
    assert_eq!(r.feeds.len(), 2);

    let stale = run_time() - ChronoDuration::hours(49);
    let fetcher = StubFetcher::default()
        .with(
            "https://feeds.test/finews",
            Canned::Entries(vec![entry("https://www.finews.ch/a", "Bank", "", stale)]),
        )
        .with("https://feeds.test/vara", Canned::Fail);

    let outcome = r.run(&fetcher, None, run_time()).await.unwrap();
    match outcome {
        DigestOutcome::Empty { stats } => {
            assert_eq!(stats.out_of_window, 1);
            assert_eq!(stats.feeds_failed, 1);
        }
        other => panic!("expected empty outcome, got {other:?}"),
    }
    assert!(!out.exists());
}

#[tokio::test]
async fn full_run_writes_dated_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let r = runner(out.clone());

    let now = run_time();
    let fetcher = StubFetcher::default()
        .with(
            "https://feeds.test/finews",
            Canned::Entries(vec![
                entry(
                    "https://www.finews.ch/news/banken/1?utm_source=rss",
                    "Kantonalbank senkt Zinsen",
                    "Die Bank reagiert auf die SNB. Weitere Banken folgen.",
                    now - ChronoDuration::hours(2),
                ),
                entry("https://www.finews.ch/news/2", "Fußball am Sonntag", "", now),
            ]),
        )
        .with(
            "https://feeds.test/vara",
            Canned::Entries(vec![entry(
                "https://www.vara.ae/en/news/1",
                "VARA publishes stablecoin custody rules",
                "",
                now - ChronoDuration::hours(5),
            )]),
        );

    let outcome = r.run(&fetcher, None, now).await.unwrap();
    let DigestOutcome::Written {
        stats,
        picked,
        paths,
        mail,
    } = outcome
    else {
        panic!("expected written outcome");
    };

    assert_eq!(stats.kept, 3);
    assert_eq!(picked.len(), 3);
    assert_eq!(mail, MailStatus::Skipped);
    // presentation order: MENA block before DACH block
    assert_eq!(picked[0].region, Region::Mena);
    assert_eq!(picked[1].url, "https://www.finews.ch/news/banken/1");
    assert_eq!(picked[2].url, "https://www.finews.ch/news/2");

    assert_eq!(paths.csv, out.join("digest_2025-10-14.csv"));
    let csv = std::fs::read_to_string(&paths.csv).unwrap();
    assert_eq!(csv.lines().count(), 4);
    let md = std::fs::read_to_string(&paths.markdown).unwrap();
    assert!(md.contains("## DACH"));
    assert!(md.contains("## MENA"));
}

#[test]
fn subject_carries_the_run_date() {
    assert_eq!(
        digest_subject(&run_time()),
        "Daily Digest – Banking/Finance/Crypto (DACH & MENA) – 2025-10-14"
    );
}

#[tokio::test]
async fn unreachable_smtp_is_reported_as_failed_and_keeps_files() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let r = runner(out.clone());

    let now = run_time();
    let fetcher = StubFetcher::default().with(
        "https://feeds.test/finews",
        Canned::Entries(vec![entry(
            "https://www.finews.ch/news/banken/7",
            "Privatbank meldet Rekordgewinn",
            "",
            now - ChronoDuration::hours(1),
        )]),
    );
    let mail = MailConfig {
        host: "127.0.0.1".into(),
        port: 1,
        user: "digest@example.com".into(),
        pass: "secret".into(),
        to: "team@example.com".into(),
        from: "digest@example.com".into(),
    };

    let outcome = r.run(&fetcher, Some(&mail), now).await.unwrap();
    let DigestOutcome::Written { paths, mail, .. } = outcome else {
        panic!("expected written outcome");
    };
    assert_eq!(mail, MailStatus::Failed);
    assert!(paths.csv.exists());
    assert!(paths.markdown.exists());
}

#[tokio::test]
async fn text_body_names_the_configured_out_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("berichte");
    let r = runner(out.clone());

    let now = run_time();
    let fetcher = StubFetcher::default().with(
        "https://feeds.test/vara",
        Canned::Entries(vec![entry(
            "https://www.vara.ae/en/news/9",
            "VARA licenses new exchange",
            "",
            now - ChronoDuration::hours(3),
        )]),
    );
    let DigestOutcome::Written { picked, paths, .. } = r.run(&fetcher, None, now).await.unwrap() else {
        panic!("expected written outcome");
    };

    let email = digest_email(&picked, &paths, &r.out_dir, &now);
    assert!(email.text_body.contains(&format!("{}/", out.display())));
    assert!(!email.text_body.contains("./out/"));
}
