//! Load shedding middleware
//!
//! Caps in-flight rerank requests. Requests arriving while every slot is
//! taken are rejected with 503 instead of queueing behind the worker pool.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use docrank_common::errors::{ErrorCode, ErrorResponse};
use docrank_common::metrics;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Shared in-flight request budget
pub type RequestSlots = Arc<Semaphore>;

pub fn request_slots(max_concurrent: usize) -> RequestSlots {
    Arc::new(Semaphore::new(max_concurrent.max(1)))
}

pub async fn load_shed(
    State(slots): State<RequestSlots>,
    request: Request,
    next: Next,
) -> Response {
    match slots.try_acquire_owned() {
        Ok(_permit) => next.run(request).await,
        Err(_) => {
            tracing::warn!("Concurrent request limit reached, shedding request");
            metrics::record_rerank_error("OVERLOADED");
            let body = ErrorResponse {
                detail: "Service is at capacity, retry shortly".to_string(),
                code: ErrorCode::InternalError,
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_slots_creation() {
        let slots = request_slots(3);
        assert_eq!(slots.available_permits(), 3);
        assert_eq!(request_slots(0).available_permits(), 1);
    }
}
