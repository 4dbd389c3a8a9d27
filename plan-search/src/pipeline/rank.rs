//! Final ordering of candidates.

use crate::config::DEFAULT_TOP_N;
use crate::types::Candidate;

/// Sort by score descending and keep the first `top_n`.
///
/// The sort is stable, so equal scores keep their incoming order. `None`
/// falls back to [`DEFAULT_TOP_N`].
pub fn rank(mut candidates: Vec<Candidate>, top_n: Option<usize>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(top_n.unwrap_or(DEFAULT_TOP_N));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchHit;

    fn candidate(url: &str, score: i32) -> Candidate {
        let hit = SearchHit {
            title: String::new(),
            url: url.into(),
            snippet: String::new(),
            source_query: "q".into(),
        };
        Candidate::from_hit(&hit, url, score, Vec::new())
    }

    fn urls(ranked: &[Candidate]) -> Vec<&str> {
        ranked.iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn sorts_descending_and_keeps_ties_in_order() {
        let ranked = rank(
            vec![
                candidate("https://a.org/1", 3),
                candidate("https://a.org/2", 7),
                candidate("https://a.org/3", 3),
                candidate("https://a.org/4", 5),
            ],
            Some(10),
        );
        assert_eq!(
            urls(&ranked),
            vec!["https://a.org/2", "https://a.org/4", "https://a.org/1", "https://a.org/3"]
        );
    }

    #[test]
    fn truncates_to_top_n() {
        let many: Vec<_> = (0..8).map(|i| candidate(&format!("https://a.org/{i}"), i)).collect();
        assert_eq!(rank(many.clone(), Some(2)).len(), 2);
        assert_eq!(rank(many.clone(), None).len(), DEFAULT_TOP_N);
        assert!(rank(many, Some(0)).is_empty());
    }

    #[test]
    fn ranking_is_stable_across_runs() {
        let input = vec![
            candidate("https://a.org/x", 4),
            candidate("https://a.org/y", 4),
            candidate("https://a.org/z", 4),
        ];
        assert_eq!(rank(input.clone(), None), rank(input, None));
    }
}
