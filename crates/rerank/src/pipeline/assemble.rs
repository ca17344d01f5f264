use super::{RankedResult, RerankResponse, ScoredCandidate};
use std::time::Instant;

/// Build the response body from the selected candidates.
///
/// `started` is the instant intake began; the elapsed time is measured on the
/// monotonic clock.
pub fn assemble(
    selected: Vec<ScoredCandidate>,
    total_found: usize,
    started: Instant,
) -> RerankResponse {
    let results = selected
        .into_iter()
        .map(|scored| RankedResult {
            id: scored.candidate.id,
            text: scored.candidate.text,
            hybrid_score: scored.hybrid_score,
            metadata: scored.candidate.metadata,
        })
        .collect();

    RerankResponse {
        results,
        total_found,
        processing_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    }
}
