// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod catalog;
pub mod config;
pub mod digest;
pub mod ingest;
pub mod notify;
pub mod output;
pub mod ranking;
pub mod region;
pub mod relevance;
pub mod source_weights;

// ---- Re-exports for stable public API ----
pub use crate::catalog::{Catalog, FeedSource};
pub use crate::digest::{DigestOutcome, DigestRunner};
pub use crate::ingest::types::{FeedFetcher, NewsItem, RawEntry};
pub use crate::ingest::Pipeline;
pub use crate::region::Region;
pub use crate::relevance::Scorer;
pub use crate::source_weights::SourceWeights;
