//! Two-phase selection: top-N per region, then a merged presentation order.
//!
//! Every region with content is represented; a prolific high-scoring region
//! cannot crowd out the others.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::ingest::types::NewsItem;

pub const DEFAULT_TOP_N: usize = 18;

/// `(score, published)` descending.
pub fn by_score_then_recency(a: &NewsItem, b: &NewsItem) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.published.cmp(&a.published))
}

/// `(region, score, published)` descending.
fn by_region_score_recency(a: &NewsItem, b: &NewsItem) -> Ordering {
    b.region
        .cmp(&a.region)
        .then_with(|| by_score_then_recency(a, b))
}

/// Score-rank a single group in place.
pub fn sort_by_score(items: &mut [NewsItem]) {
    items.sort_by(by_score_then_recency);
}

/// Keep the best `top_n` items of each region and return them grouped by
/// region (descending tag order), score-ranked within each group.
/// Sorting is stable: exact ties keep their input order.
pub fn pick_top(items: Vec<NewsItem>, top_n: usize) -> Vec<NewsItem> {
    let mut by_region: BTreeMap<_, Vec<NewsItem>> = BTreeMap::new();
    for it in items {
        by_region.entry(it.region).or_default().push(it);
    }

    let mut picked = Vec::new();
    for (_, mut group) in by_region {
        sort_by_score(&mut group);
        group.truncate(top_n);
        picked.extend(group);
    }

    picked.sort_by(by_region_score_recency);
    picked
}
