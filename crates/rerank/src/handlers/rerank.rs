//! Rerank handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use tracing::{debug, info};

use crate::pipeline::{Diagnostics, RawRerankRequest, RerankResponse};
use crate::AppState;
use docrank_common::{
    errors::{AppError, Result},
    metrics,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Rerank a batch of vector search candidates
///
/// POST /rerank (alias /re-rank)
pub async fn rerank(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<RawRerankRequest>, JsonRejection>,
) -> Result<Json<RerankResponse>> {
    let request_metrics = metrics::RequestMetrics::start("POST", "/rerank");
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let result = match payload {
        Ok(Json(raw)) => state.pool.run(raw).await,
        Err(rejection) => Err(AppError::InvalidFormat {
            message: rejection.body_text(),
        }),
    };

    match result {
        Ok(outcome) => {
            record_diagnostics(&outcome.diagnostics);
            let response = outcome.response;
            info!(
                request_id = %request_id,
                candidates = outcome.diagnostics.received,
                quality_rejected = outcome.diagnostics.quality.total(),
                below_threshold = outcome.diagnostics.below_threshold,
                duplicates_removed = outcome.diagnostics.duplicates_removed,
                returned = response.results.len(),
                total_found = response.total_found,
                latency_ms = response.processing_time_ms,
                "Rerank completed"
            );
            request_metrics.finish(200);
            Ok(Json(response))
        }
        Err(e) => {
            // Logged once by `IntoResponse`, inside the request span
            metrics::record_rerank_error(e.code().as_str());
            request_metrics.finish(e.status_code().as_u16());
            Err(e)
        }
    }
}

fn record_diagnostics(diagnostics: &Diagnostics) {
    for (stage, elapsed) in diagnostics.timings.stages() {
        metrics::record_stage(stage, elapsed.as_secs_f64());
    }
    for (rule, count) in diagnostics.quality.iter() {
        if count > 0 {
            debug!(rule = rule.as_str(), count, "Quality rejections");
        }
        metrics::record_quality_rejections(rule.as_str(), count);
    }
    metrics::record_rerank(
        diagnostics.received,
        diagnostics.below_threshold,
        diagnostics.duplicates_removed,
        diagnostics.returned,
    );
}
