// tests/ranking_regions.rs
mod common;

use chrono::Duration as ChronoDuration;

use common::{item, run_time};
use daily_digest::ranking::pick_top;
use daily_digest::region::Region;

#[test]
fn busy_region_cannot_crowd_out_the_other() {
    let now = run_time();
    let mut items = Vec::new();
    for i in 0..30 {
        items.push(item(Region::Dach, 100.0 + i as f64, now, &format!("d{i}")));
        items.push(item(Region::Mena, 1.0 + i as f64 / 100.0, now, &format!("m{i}")));
    }

    let picked = pick_top(items, 18);
    assert_eq!(picked.len(), 36);
    assert_eq!(picked.iter().filter(|i| i.region == Region::Dach).count(), 18);
    assert_eq!(picked.iter().filter(|i| i.region == Region::Mena).count(), 18);

    // MENA block first, then DACH; each block score-descending
    assert_eq!(picked[0].url, "m29");
    assert_eq!(picked[17].url, "m12");
    assert_eq!(picked[18].url, "d29");
    assert_eq!(picked[35].url, "d12");
}

#[test]
fn small_regions_are_kept_whole() {
    let now = run_time();
    let items = vec![
        item(Region::Global, 2.0, now, "g1"),
        item(Region::Dach, 1.0, now, "d1"),
    ];
    let picked = pick_top(items, 18);
    let urls: Vec<_> = picked.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec!["g1", "d1"]);
}

#[test]
fn equal_scores_prefer_newer_items() {
    let now = run_time();
    let items = vec![
        item(Region::Mena, 4.2, now - ChronoDuration::hours(3), "old"),
        item(Region::Mena, 4.2, now, "new"),
        item(Region::Mena, 4.2, now - ChronoDuration::hours(1), "mid"),
    ];
    let picked = pick_top(items, 2);
    let urls: Vec<_> = picked.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec!["new", "mid"]);
}

#[test]
fn top_n_zero_selects_nothing() {
    let now = run_time();
    assert!(pick_top(vec![item(Region::Dach, 1.0, now, "d")], 0).is_empty());
}

#[test]
fn selection_is_deterministic() {
    let now = run_time();
    let items: Vec<_> = (0..50)
        .map(|i| {
            let region = Region::ALL[i % 3];
            item(region, (i % 7) as f64, now - ChronoDuration::minutes((i % 5) as i64), &format!("u{i}"))
        })
        .collect();
    assert_eq!(pick_top(items.clone(), 10), pick_top(items, 10));
}
