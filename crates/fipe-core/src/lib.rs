//! FIPE Core - selection cascade, caching and user-facing lists.
//!
//! This crate drives a vehicle price lookup on top of `fipe-data`: the
//! dependent brand → model → year selection with its degrade chain
//! (providers, then cache, then bundled data), the persistent cache it reads
//! and writes, the recent-history and compare lists, and the asking-price
//! evaluation.

pub mod cache;
pub mod cascade;
pub mod deal;
pub mod errors;
pub mod history;

pub use cache::{CacheKey, CacheStore, FileCacheStore, MemoryCacheStore};
pub use cascade::{
    Advisory, CascadeConfig, CascadeError, CascadeEvent, CascadeEventSink, CascadeSnapshot, Level,
    MockCascadeEventSink, NoOpCascadeEventSink, SelectionCascade, SessionYearCache, YearWindow,
};
pub use deal::{evaluate_deal, parse_brl_price, DealEvaluation, DealVerdict};
pub use history::{CompareList, CompareRejection, HistoryEntry, RecentHistory};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
