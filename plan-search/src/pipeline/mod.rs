//! Discovery pipeline: filter, score, deduplicate, rank, and the
//! orchestrator that runs them in order over harvested hits.

pub mod dedup;
pub mod discover;
pub mod filter;
pub mod rank;
pub mod scoring;
pub mod url_normalize;

pub use discover::{DiscoveryEngine, DiscoveryRequest};
