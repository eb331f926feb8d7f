pub mod rss;

pub use rss::{parse_feed, HttpFeedFetcher};
