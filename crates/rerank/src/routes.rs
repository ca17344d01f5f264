//! HTTP routing and middleware stack

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::{load_shed, request_slots};
use crate::pool::RerankPool;
use docrank_common::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: RerankPool,
    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, metrics: PrometheusHandle) -> Self {
        let pool = RerankPool::new((&*config).into(), config.worker_count());
        Self {
            config,
            pool,
            metrics,
        }
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;

    let rerank_routes = Router::new()
        .route("/rerank", post(handlers::rerank::rerank))
        .route("/re-rank", post(handlers::rerank::rerank))
        .route_layer(middleware::from_fn_with_state(
            request_slots(server.max_concurrent_requests),
            load_shed,
        ))
        .layer(DefaultBodyLimit::max(server.max_body_bytes));

    let ops_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/config", get(handlers::config::config_view))
        .route("/metrics", get(handlers::metrics::metrics));

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    // Last layer added runs first: the request id must exist before tracing
    Router::new()
        .merge(rerank_routes)
        .merge(ops_routes)
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(trace)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
