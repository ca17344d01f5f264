//! Request intake and validation
//!
//! The only place client input is checked. Everything downstream relies on
//! the invariants established here: non-blank query and texts, unique ids,
//! scores and threshold in [0, 1], positive limit, positive finite weights.

use super::{Candidate, IdfMap, Metadata, QueryContext, RerankRequest};
use docrank_common::config::RerankConfig;
use docrank_common::errors::{AppError, Result};
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use validator::{Validate, ValidationError};

/// Rerank request as received on the wire
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RawRerankRequest {
    /// The original search query
    #[validate(custom(function = "non_blank_query"))]
    pub query: String,

    /// Raw vector search matches to rerank
    #[serde(default)]
    #[validate(nested)]
    pub candidates: Vec<RawCandidate>,

    /// Maximum number of results to return
    #[serde(default)]
    #[validate(range(min = 1, message = "Limit must be greater than 0"))]
    pub limit: Option<i64>,

    /// Minimum acceptable similarity
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0, message = "Threshold must be between 0 and 1"))]
    pub threshold: Option<f64>,

    /// Optional per-term weights
    #[serde(default)]
    #[validate(custom(function = "positive_weights"))]
    pub idf_map: Option<HashMap<String, f64>>,
}

/// A single vector search match
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RawCandidate {
    #[validate(custom(function = "non_blank_id"))]
    pub id: String,

    #[validate(custom(function = "non_blank_text"))]
    pub text: String,

    /// Similarity score from the vector search
    #[serde(rename = "score")]
    #[validate(range(min = 0.0, max = 1.0, message = "Similarity score must be between 0 and 1"))]
    pub similarity_score: f64,

    #[serde(default)]
    pub metadata: Option<Metadata>,
}

fn non_blank(value: &str, message: &'static str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed(message)));
    }
    Ok(())
}

fn non_blank_query(query: &str) -> std::result::Result<(), ValidationError> {
    non_blank(query, "Query string is empty")
}

fn non_blank_id(id: &str) -> std::result::Result<(), ValidationError> {
    non_blank(id, "Candidate id is empty")
}

fn non_blank_text(text: &str) -> std::result::Result<(), ValidationError> {
    non_blank(text, "Candidate text is empty")
}

/// Reports the lexicographically first term whose weight is not a positive number
fn positive_weights(weights: &HashMap<String, f64>) -> std::result::Result<(), ValidationError> {
    let invalid = weights
        .iter()
        .filter(|(_, w)| !(w.is_finite() && **w > 0.0))
        .min_by(|a, b| a.0.cmp(b.0));
    match invalid {
        Some((term, weight)) => Err(ValidationError::new("idf_weight").with_message(
            Cow::Owned(format!(
                "IDF weight for term '{term}' must be a positive number, got {weight}"
            )),
        )),
        None => Ok(()),
    }
}

/// Validate a raw request into an immutable [`RerankRequest`]
pub fn validate(raw: RawRerankRequest, config: &RerankConfig) -> Result<RerankRequest> {
    if raw.candidates.len() > config.max_candidates {
        return Err(AppError::validation(format!(
            "Too many candidates: {} exceeds the maximum of {}",
            raw.candidates.len(),
            config.max_candidates
        )));
    }

    raw.validate().map_err(|e| AppError::from_validation(&e))?;

    let limit = raw
        .limit
        .map_or(config.default_limit, |limit| {
            usize::try_from(limit).unwrap_or(usize::MAX)
        })
        .min(config.max_limit);
    let threshold = raw.threshold.unwrap_or(config.default_threshold);

    let candidates = collect_candidates(raw.candidates)?;
    let idf_map = IdfMap::new(raw.idf_map.unwrap_or_default());

    Ok(RerankRequest {
        query_context: QueryContext {
            query: raw.query,
            idf_map,
        },
        candidates,
        limit,
        threshold,
    })
}

/// Checks the derive cannot express: unique ids and NaN scores
fn collect_candidates(raw: Vec<RawCandidate>) -> Result<Vec<Candidate>> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut candidates = Vec::with_capacity(raw.len());

    for (index, candidate) in raw.into_iter().enumerate() {
        if !seen.insert(candidate.id.clone()) {
            return Err(AppError::validation(format!(
                "Duplicate candidate id '{}'",
                candidate.id
            )));
        }
        if candidate.similarity_score.is_nan() {
            return Err(AppError::validation(format!(
                "candidates[{index}]: Similarity score must be between 0 and 1"
            )));
        }

        candidates.push(Candidate {
            id: candidate.id,
            text: candidate.text,
            similarity_score: candidate.similarity_score,
            metadata: candidate.metadata.unwrap_or_default(),
        });
    }

    Ok(candidates)
}
