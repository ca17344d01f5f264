//! Near-duplicate removal
//!
//! Passages are compared by the Jaccard similarity of their word shingle sets.
//! Pairs at or above the threshold are linked, linked passages form clusters
//! (transitively), and each cluster keeps its best-ranked member.

use super::select::rank_order;
use super::text::tokenize;
use super::ScoredCandidate;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use textdistance::{Algorithm, Jaccard};

/// Hashed `n`-word shingles of `text`.
///
/// Text with fewer than `n` tokens yields one shingle covering all of them;
/// text without tokens yields none.
pub fn shingles(text: &str, n: usize) -> HashSet<u64> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return HashSet::new();
    }
    let width = n.clamp(1, tokens.len());
    tokens.windows(width).map(hash_window).collect()
}

fn hash_window(window: &[String]) -> u64 {
    let mut hasher = DefaultHasher::new();
    window.hash(&mut hasher);
    hasher.finish()
}

/// Jaccard similarity of two shingle sets; 0.0 when either is empty
pub fn jaccard(a: &HashSet<u64>, b: &HashSet<u64>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    Jaccard::default().for_iter(a.iter(), b.iter()).nsim()
}

/// Disjoint-set forest over candidate indices
struct Clusters {
    parent: Vec<usize>,
}

impl Clusters {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn root(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            let grandparent = self.parent[self.parent[i]];
            self.parent[i] = grandparent;
            i = grandparent;
        }
        i
    }

    fn join(&mut self, a: usize, b: usize) {
        let (a, b) = (self.root(a), self.root(b));
        if a != b {
            self.parent[a.max(b)] = a.min(b);
        }
    }
}

/// Keep the best member of every duplicate cluster.
///
/// Survivors keep their relative input order. Returns the survivors and the
/// number of candidates removed.
pub fn deduplicate(
    candidates: Vec<ScoredCandidate>,
    shingle_size: usize,
    threshold: f64,
) -> (Vec<ScoredCandidate>, usize) {
    let len = candidates.len();
    if len < 2 {
        return (candidates, 0);
    }

    let sets: Vec<HashSet<u64>> = candidates
        .iter()
        .map(|c| shingles(&c.candidate.text, shingle_size))
        .collect();

    let mut clusters = Clusters::new(len);
    for i in 0..len {
        for j in (i + 1)..len {
            let (a, b) = (sets[i].len(), sets[j].len());
            // Jaccard can never exceed min/max of the set sizes
            if a.min(b) == 0 || (a.min(b) as f64) < threshold * a.max(b) as f64 {
                continue;
            }
            if jaccard(&sets[i], &sets[j]) >= threshold {
                clusters.join(i, j);
            }
        }
    }

    // Best member per cluster root
    let mut best: Vec<Option<usize>> = vec![None; len];
    for i in 0..len {
        let root = clusters.root(i);
        best[root] = match best[root] {
            Some(current)
                if rank_order(&candidates[current], &candidates[i]) != Ordering::Greater =>
            {
                Some(current)
            }
            _ => Some(i),
        };
    }
    let keep: HashSet<usize> = best.into_iter().flatten().collect();

    let survivors: Vec<ScoredCandidate> = candidates
        .into_iter()
        .enumerate()
        .filter(|(i, _)| keep.contains(i))
        .map(|(_, c)| c)
        .collect();
    let removed = len - survivors.len();
    (survivors, removed)
}
