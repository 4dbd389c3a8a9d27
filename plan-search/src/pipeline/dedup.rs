//! Candidate deduplication by normalised resolved URL.
//!
//! The same document is routinely observed under several queries, and
//! sometimes under a search-engine redirect on one page and a direct link
//! on another. Both collapse to a single record here.

use std::collections::HashMap;

use crate::types::Candidate;

use super::filter::resolve_redirect;
use super::url_normalize::normalize_url;

/// Key two candidates share when they point at the same document.
pub fn dedup_key(candidate: &Candidate) -> String {
    normalize_url(&resolve_redirect(&candidate.url))
}

/// Merge candidates that point at the same document.
///
/// The higher-scoring record survives and takes the slot of the first
/// observation; on a tie the first seen is kept. Reasons are never merged
/// across records. Output keeps first-seen order.
pub fn merge(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<Candidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let key = dedup_key(&candidate);
        match slots.get(&key) {
            Some(&slot) => {
                if candidate.score > merged[slot].score {
                    merged[slot] = candidate;
                }
            }
            None => {
                slots.insert(key, merged.len());
                merged.push(candidate);
            }
        }
    }

    merged
}
