//! DocRank Rerank Service
//!
//! Post-retrieval reranking of vector search results:
//! - Quality filtering of low-information passages
//! - Hybrid scoring (semantic similarity + weighted keyword overlap)
//! - Shingle-based near-duplicate removal
//! - Deterministic ordering and truncation

pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod pool;
pub mod routes;
pub mod telemetry;

pub use pipeline::{rerank, EngineConfig, RerankOutcome, RerankResponse};
pub use pool::RerankPool;
pub use routes::{create_router, AppState};
