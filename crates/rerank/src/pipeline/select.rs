//! Similarity floor, deterministic ordering and truncation

use super::ScoredCandidate;
use std::cmp::Ordering;

/// Total order over scored candidates: hybrid score descending, then
/// similarity descending, then id ascending.
///
/// `Ordering::Less` means `a` ranks ahead of `b`.
pub fn rank_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.hybrid_score
        .total_cmp(&a.hybrid_score)
        .then_with(|| {
            b.candidate
                .similarity_score
                .total_cmp(&a.candidate.similarity_score)
        })
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}

/// Drop candidates whose similarity is below `threshold`.
///
/// Returns the survivors (order preserved) and the number dropped.
pub fn apply_floor(
    candidates: Vec<ScoredCandidate>,
    threshold: f64,
) -> (Vec<ScoredCandidate>, usize) {
    let before = candidates.len();
    let kept: Vec<ScoredCandidate> = candidates
        .into_iter()
        .filter(|c| c.candidate.similarity_score >= threshold)
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Sort by [`rank_order`] and keep the first `limit`
pub fn select(mut candidates: Vec<ScoredCandidate>, limit: usize) -> Vec<ScoredCandidate> {
    candidates.sort_by(rank_order);
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Candidate, Metadata};

    fn scored(id: &str, similarity: f64, hybrid: f64) -> ScoredCandidate {
        ScoredCandidate {
            candidate: Candidate {
                id: id.to_string(),
                text: format!("text of {id}"),
                similarity_score: similarity,
                metadata: Metadata::new(),
            },
            keyword_score: 0.0,
            hybrid_score: hybrid,
        }
    }

    fn ids(candidates: &[ScoredCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.candidate.id.as_str()).collect()
    }

    #[test]
    fn test_floor_is_inclusive() {
        let (kept, dropped) = apply_floor(
            vec![scored("a", 0.69, 0.9), scored("b", 0.70, 0.1), scored("c", 0.95, 0.5)],
            0.7,
        );
        assert_eq!(ids(&kept), vec!["b", "c"]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_floor_ignores_hybrid_score() {
        let (kept, _) = apply_floor(vec![scored("a", 0.5, 1.0)], 0.6);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_rank_order_tie_breaks() {
        let ordered = select(
            vec![
                scored("d", 0.7, 0.5),
                scored("c", 0.8, 0.6),
                scored("b", 0.9, 0.6),
                scored("a", 0.8, 0.6),
            ],
            10,
        );
        assert_eq!(ids(&ordered), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_select_truncates() {
        let candidates = (0..20)
            .map(|i| scored(&format!("c{i:02}"), 0.8, i as f64 / 20.0))
            .collect();
        let selected = select(candidates, 5);
        assert_eq!(ids(&selected), vec!["c19", "c18", "c17", "c16", "c15"]);
    }

    #[test]
    fn test_select_fewer_than_limit() {
        let selected = select(vec![scored("a", 0.8, 0.5)], 10);
        assert_eq!(selected.len(), 1);
        assert!(select(vec![], 3).is_empty());
    }
}
