//! DocRank Common Library
//!
//! Shared code for the DocRank services:
//! - Configuration management
//! - Error types and HTTP error mapping
//! - Metrics registration and recording helpers

pub mod config;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name reported by health checks
pub const SERVICE_NAME: &str = "docrank-rerank";
