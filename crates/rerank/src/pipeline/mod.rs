//! Result reranking pipeline
//!
//! Stages run in strict sequence, each a pure function of its input plus the
//! static engine configuration:
//! - Intake (validation of the raw request)
//! - Quality filter (low-information passages)
//! - Hybrid scoring (similarity fused with keyword relevance)
//! - Deduplication (word-shingle Jaccard clustering)
//! - Similarity floor
//! - Selection (deterministic sort and truncation)
//! - Response assembly

mod assemble;
mod dedup;
mod idf;
mod intake;
mod quality;
mod scoring;
mod select;
mod text;

pub use assemble::assemble;
pub use dedup::{deduplicate, jaccard, shingles};
pub use idf::{IdfMap, DEFAULT_IDF_WEIGHT};
pub use intake::{validate, RawCandidate, RawRerankRequest};
pub use quality::{QualityReport, QualityRule};
pub use scoring::{hybrid_score, QueryTerms};
pub use select::{apply_floor, rank_order, select};
pub use text::{tokenize, word_count};

use docrank_common::config::{AppConfig, QualityConfig, RerankConfig};
use docrank_common::errors::Result;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Opaque key-value bag carried through the pipeline untouched
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One retrieved passage awaiting reranking
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Unique within a request
    pub id: String,

    /// Passage text (never blank)
    pub text: String,

    /// Upstream vector similarity in [0, 1]
    pub similarity_score: f64,

    pub metadata: Metadata,
}

/// Query text plus term weights
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub query: String,
    pub idf_map: IdfMap,
}

/// Validated, immutable rerank request.
///
/// Only [`validate`] constructs one, so every value satisfies the intake
/// invariants.
#[derive(Debug, Clone)]
pub struct RerankRequest {
    query_context: QueryContext,
    candidates: Vec<Candidate>,
    limit: usize,
    threshold: f64,
}

impl RerankRequest {
    pub fn query_context(&self) -> &QueryContext {
        &self.query_context
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Result count after clamping to the configured maximum
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn into_parts(self) -> (QueryContext, Vec<Candidate>, usize, f64) {
        (self.query_context, self.candidates, self.limit, self.threshold)
    }
}

/// Candidate with its computed relevance
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,

    /// Normalized keyword relevance in [0, 1]
    pub keyword_score: f64,

    /// Fused score in [0, 1]
    pub hybrid_score: f64,
}

/// A single reranked result
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub id: String,

    pub text: String,

    /// Hybrid score
    #[serde(rename = "score")]
    pub hybrid_score: f64,

    pub metadata: Metadata,
}

/// Rerank response body
#[derive(Debug, Clone, Serialize)]
pub struct RerankResponse {
    /// Ranked results, at most `limit`
    pub results: Vec<RankedResult>,

    /// Candidates surviving quality filter, dedup and threshold, before truncation
    pub total_found: usize,

    /// Processing time in milliseconds, intake to assembly
    pub processing_time_ms: u64,
}

/// Time spent in each stage
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    pub intake: Duration,
    pub quality: Duration,
    pub scoring: Duration,
    pub dedup: Duration,
    pub threshold: Duration,
    pub select: Duration,
    pub assemble: Duration,
}

impl StageTimings {
    /// Stage name / duration pairs in pipeline order
    pub fn stages(&self) -> [(&'static str, Duration); 7] {
        [
            ("intake", self.intake),
            ("quality", self.quality),
            ("scoring", self.scoring),
            ("dedup", self.dedup),
            ("threshold", self.threshold),
            ("select", self.select),
            ("assemble", self.assemble),
        ]
    }
}

/// Per-request counters reported to logs and metrics, never to the caller
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub received: usize,
    pub quality: QualityReport,
    pub below_threshold: usize,
    pub duplicates_removed: usize,
    pub returned: usize,
    pub timings: StageTimings,
}

/// Response plus the diagnostics gathered producing it
#[derive(Debug, Clone)]
pub struct RerankOutcome {
    pub response: RerankResponse,
    pub diagnostics: Diagnostics,
}

/// Static engine parameters, loaded once and shared by reference
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub rerank: RerankConfig,
    pub quality: QualityConfig,
}

impl From<&AppConfig> for EngineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            rerank: config.rerank.clone(),
            quality: config.quality.clone(),
        }
    }
}

/// Run the full pipeline over a raw request
pub fn rerank(raw: RawRerankRequest, config: &EngineConfig) -> Result<RerankOutcome> {
    let started = Instant::now();
    let mut diagnostics = Diagnostics {
        received: raw.candidates.len(),
        ..Default::default()
    };

    let request = validate(raw, &config.rerank)?;
    diagnostics.timings.intake = started.elapsed();
    let (query_context, candidates, limit, threshold) = request.into_parts();

    let stage = Instant::now();
    let (candidates, report) = quality::filter(candidates, &config.quality);
    diagnostics.timings.quality = stage.elapsed();
    debug!(
        kept = candidates.len(),
        rejected = report.total(),
        "Quality filter applied"
    );
    diagnostics.quality = report;

    let stage = Instant::now();
    let scored = scoring::score_all(candidates, &query_context, config.rerank.alpha)?;
    diagnostics.timings.scoring = stage.elapsed();

    let stage = Instant::now();
    let (unique, duplicates_removed) = deduplicate(
        scored,
        config.rerank.shingle_size,
        config.rerank.dedup_threshold,
    );
    diagnostics.timings.dedup = stage.elapsed();
    diagnostics.duplicates_removed = duplicates_removed;

    let stage = Instant::now();
    let (unique, below_threshold) = apply_floor(unique, threshold);
    diagnostics.timings.threshold = stage.elapsed();
    diagnostics.below_threshold = below_threshold;
    debug!(
        duplicates_removed,
        below_threshold,
        remaining = unique.len(),
        "Dedup and floor applied"
    );

    let total_found = unique.len();
    let stage = Instant::now();
    let selected = select(unique, limit);
    diagnostics.timings.select = stage.elapsed();

    let stage = Instant::now();
    let response = assemble(selected, total_found, started);
    diagnostics.timings.assemble = stage.elapsed();
    diagnostics.returned = response.results.len();

    Ok(RerankOutcome {
        response,
        diagnostics,
    })
}
