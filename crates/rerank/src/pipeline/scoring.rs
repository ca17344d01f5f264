//! Hybrid relevance scoring
//!
//! `hybrid = alpha * similarity + (1 - alpha) * keyword`, where `keyword` is
//! the weighted fraction of distinct query terms found in the passage.

use super::text::tokenize;
use super::{Candidate, IdfMap, QueryContext, ScoredCandidate};
use docrank_common::errors::{AppError, Result};
use std::collections::HashSet;

/// Distinct query terms with their weights, in first-occurrence order.
///
/// Weights are stored relative to the largest one, so the largest is 1.0.
#[derive(Debug, Clone)]
pub struct QueryTerms {
    terms: Vec<(String, f64)>,
    total_weight: f64,
}

impl QueryTerms {
    pub fn new(query: &str, idf_map: &IdfMap) -> Self {
        let mut seen = HashSet::new();
        let mut terms: Vec<(String, f64)> = tokenize(query)
            .into_iter()
            .filter(|term| seen.insert(term.clone()))
            .map(|term| {
                let weight = idf_map.weight(&term);
                (term, weight)
            })
            .collect();

        // Weights are relative; scaling by the largest keeps the sums finite
        let largest = terms.iter().map(|(_, w)| *w).fold(0.0, f64::max);
        if largest > 0.0 {
            for (_, weight) in terms.iter_mut() {
                *weight /= largest;
            }
        }
        let total_weight = terms.iter().map(|(_, w)| w).sum();

        Self {
            terms,
            total_weight,
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Weighted share of query terms present in `text`, in [0, 1].
    ///
    /// A query with no usable terms contributes nothing.
    pub fn keyword_score(&self, text: &str) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        let tokens: HashSet<String> = tokenize(text).into_iter().collect();
        let matched: f64 = self
            .terms
            .iter()
            .filter(|(term, _)| tokens.contains(term))
            .map(|(_, weight)| weight)
            .sum();
        (matched / self.total_weight).clamp(0.0, 1.0)
    }
}

/// Fuse similarity and keyword relevance
pub fn hybrid_score(alpha: f64, similarity: f64, keyword: f64) -> f64 {
    (alpha * similarity + (1.0 - alpha) * keyword).clamp(0.0, 1.0)
}

/// Score every candidate, preserving order
pub fn score_all(
    candidates: Vec<Candidate>,
    query: &QueryContext,
    alpha: f64,
) -> Result<Vec<ScoredCandidate>> {
    let terms = QueryTerms::new(&query.query, &query.idf_map);

    candidates
        .into_iter()
        .map(|candidate| {
            let keyword_score = terms.keyword_score(&candidate.text);
            let hybrid = hybrid_score(alpha, candidate.similarity_score, keyword_score);
            if !hybrid.is_finite() {
                return Err(AppError::processing(format!(
                    "Non-finite score computed for candidate '{}'",
                    candidate.id
                )));
            }
            Ok(ScoredCandidate {
                candidate,
                keyword_score,
                hybrid_score: hybrid,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Metadata;

    fn context(query: &str, weights: Vec<(&str, f64)>) -> QueryContext {
        QueryContext {
            query: query.to_string(),
            idf_map: IdfMap::new(weights.into_iter().map(|(t, w)| (t.to_string(), w))),
        }
    }

    fn candidate(id: &str, text: &str, score: f64) -> Candidate {
        Candidate {
            id: id.to_string(),
            text: text.to_string(),
            similarity_score: score,
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn test_query_terms_are_distinct_and_ordered() {
        let terms = QueryTerms::new("Wind wind SOLAR, wind", &IdfMap::default());
        assert_eq!(terms.len(), 2);
        assert_eq!(terms.terms[0].0, "wind");
        assert_eq!(terms.terms[1].0, "solar");
        assert_eq!(terms.total_weight, 2.0);
    }

    #[test]
    fn test_unweighted_keyword_fraction() {
        let terms = QueryTerms::new("renewable energy benefits", &IdfMap::default());
        let score = terms.keyword_score("Environmental benefits of solar energy.");
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_extreme_weights_do_not_overflow() {
        let ctx = context("solar wind", vec![("solar", 1e308), ("wind", 1e308)]);
        let terms = QueryTerms::new(&ctx.query, &ctx.idf_map);
        assert_eq!(terms.total_weight, 2.0);
        assert_eq!(terms.keyword_score("solar and wind farms"), 1.0);
        assert_eq!(terms.keyword_score("solar farms"), 0.5);

        let scored = score_all(vec![candidate("a", "solar farms", 0.8)], &ctx, 0.7).unwrap();
        assert!(scored[0].hybrid_score.is_finite());
        assert!((scored[0].hybrid_score - (0.56 + 0.15)).abs() < 1e-12);
    }

    #[test]
    fn test_idf_weights_emphasize_rare_terms() {
        let ctx = context("the photovoltaic", vec![("photovoltaic", 9.0)]);
        let terms = QueryTerms::new(&ctx.query, &ctx.idf_map);
        assert!((terms.keyword_score("photovoltaic arrays") - 0.9).abs() < 1e-12);
        assert!((terms.keyword_score("the arrays") - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_keyword_match_is_case_and_punctuation_insensitive() {
        let terms = QueryTerms::new("grid storage", &IdfMap::default());
        assert_eq!(terms.keyword_score("GRID-scale Storage!"), 1.0);
        assert_eq!(terms.keyword_score("gridlock in storages"), 0.0);
    }

    #[test]
    fn test_termless_query_scores_zero() {
        let terms = QueryTerms::new("?!", &IdfMap::default());
        assert!(terms.is_empty());
        assert_eq!(terms.keyword_score("anything at all"), 0.0);
    }

    #[test]
    fn test_hybrid_fusion() {
        assert!((hybrid_score(0.7, 0.9, 0.5) - 0.78).abs() < 1e-12);
        assert_eq!(hybrid_score(1.0, 0.4, 1.0), 0.4);
        assert_eq!(hybrid_score(0.0, 0.4, 1.0), 1.0);
    }

    #[test]
    fn test_score_all_preserves_order_and_bounds() {
        let ctx = context("solar power", vec![]);
        let scored = score_all(
            vec![
                candidate("x", "wind turbines", 0.2),
                candidate("y", "solar power plants", 1.0),
            ],
            &ctx,
            0.7,
        )
        .unwrap();
        assert_eq!(scored[0].candidate.id, "x");
        assert_eq!(scored[0].keyword_score, 0.0);
        assert!((scored[0].hybrid_score - 0.14).abs() < 1e-12);
        assert_eq!(scored[1].keyword_score, 1.0);
        assert!((scored[1].hybrid_score - 1.0).abs() < 1e-12);
        assert!(scored.iter().all(|s| (0.0..=1.0).contains(&s.hybrid_score)));
    }

    #[test]
    fn test_non_finite_score_is_processing_error() {
        let ctx = context("solar", vec![]);
        let err = score_all(vec![candidate("x", "solar", 0.5)], &ctx, f64::NAN).unwrap_err();
        assert!(matches!(err, AppError::Processing { .. }));
    }
}
