//! API handlers module

pub mod config;
pub mod health;
pub mod metrics;
pub mod rerank;
