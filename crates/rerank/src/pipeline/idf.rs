//! Caller-supplied term weights
//!
//! Keys are normalized the same way query and passage terms are (trimmed and
//! lowercased), so callers may send either raw or pre-lowercased terms. Terms
//! missing from the map weigh [`DEFAULT_IDF_WEIGHT`]. Multi-word keys never
//! match because tokens never contain separators.

use std::collections::HashMap;

/// Weight of a term the caller did not supply
pub const DEFAULT_IDF_WEIGHT: f64 = 1.0;

/// Term -> weight lookup with a total default
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdfMap {
    weights: HashMap<String, f64>,
}

impl IdfMap {
    /// Build from raw entries. Keys colliding after normalization keep the
    /// larger weight so the result never depends on input iteration order.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut weights: HashMap<String, f64> = HashMap::new();
        for (term, weight) in entries {
            let term = term.trim().to_lowercase();
            if term.is_empty() {
                continue;
            }
            weights
                .entry(term)
                .and_modify(|w| *w = w.max(weight))
                .or_insert(weight);
        }
        Self { weights }
    }

    /// Weight for a normalized term
    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(DEFAULT_IDF_WEIGHT)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_term_defaults() {
        let idf = IdfMap::default();
        assert_eq!(idf.weight("anything"), DEFAULT_IDF_WEIGHT);
        assert!(idf.is_empty());
    }

    #[test]
    fn test_keys_are_normalized() {
        let idf = IdfMap::new(vec![(" Solar ".to_string(), 2.5)]);
        assert_eq!(idf.weight("solar"), 2.5);
        assert_eq!(idf.len(), 1);
    }

    #[test]
    fn test_collisions_keep_larger_weight() {
        let forward = IdfMap::new(vec![("Wind".to_string(), 1.5), ("wind".to_string(), 3.0)]);
        let backward = IdfMap::new(vec![("wind".to_string(), 3.0), ("Wind".to_string(), 1.5)]);
        assert_eq!(forward.weight("wind"), 3.0);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_blank_keys_dropped() {
        let idf = IdfMap::new(vec![("   ".to_string(), 4.0)]);
        assert!(idf.is_empty());
    }
}
