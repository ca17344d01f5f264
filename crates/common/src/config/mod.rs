//! Configuration management for DocRank services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml)
//! - Default values
//!
//! The loaded configuration is validated once and never mutated afterwards;
//! services share it behind an `Arc`.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::errors::{AppError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    /// Reranking engine configuration
    #[serde(default)]
    #[validate(nested)]
    pub rerank: RerankConfig,

    /// Quality filter thresholds
    #[serde(default)]
    #[validate(nested)]
    pub quality: QualityConfig,

    /// Observability configuration
    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Maximum concurrent requests
    #[serde(default = "default_max_concurrent")]
    #[validate(range(min = 1))]
    pub max_concurrent_requests: usize,

    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    #[validate(range(min = 1024))]
    pub max_body_bytes: usize,

    /// Rerank worker count (0 = one per available core)
    #[serde(default)]
    pub workers: usize,
}

/// Engine parameters shared by every request
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[validate(schema(function = "validate_limits"))]
pub struct RerankConfig {
    /// Weight of the semantic similarity in the hybrid score
    #[serde(default = "default_alpha")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub alpha: f64,

    /// Shingle Jaccard similarity at or above which two passages are duplicates
    #[serde(default = "default_dedup_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub dedup_threshold: f64,

    /// Words per shingle
    #[serde(default = "default_shingle_size")]
    #[validate(range(min = 1, max = 32))]
    pub shingle_size: usize,

    /// Maximum accepted candidate count per request
    #[serde(default = "default_max_candidates")]
    #[validate(range(min = 1))]
    pub max_candidates: usize,

    /// Result count used when the request omits `limit`
    #[serde(default = "default_limit")]
    #[validate(range(min = 1))]
    pub default_limit: usize,

    /// Upper bound applied to any requested `limit`
    #[serde(default = "default_max_limit")]
    #[validate(range(min = 1))]
    pub max_limit: usize,

    /// Similarity floor used when the request omits `threshold`
    #[serde(default = "default_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub default_threshold: f64,
}

/// Thresholds for the low-information passage filter
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct QualityConfig {
    /// Minimum passage length in characters
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    /// Maximum passage length in characters
    #[serde(default = "default_max_chars")]
    #[validate(range(min = 1))]
    pub max_chars: usize,

    /// Minimum passage length in words
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    /// Actual / claimed (`metadata.word_count`) word ratio floor
    #[serde(default = "default_min_word_count_ratio")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_word_count_ratio: f64,

    /// Alphabetic / non-whitespace character ratio floor
    #[serde(default = "default_min_alpha_ratio")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_alpha_ratio: f64,

    /// Punctuation and symbol / non-whitespace character ratio ceiling
    #[serde(default = "default_max_symbol_ratio")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_symbol_ratio: f64,

    /// Longest allowed run of one token repeated back to back
    #[serde(default = "default_max_token_run")]
    #[validate(range(min = 1))]
    pub max_token_run: usize,

    /// Longest allowed run of one character repeated back to back
    #[serde(default = "default_max_char_run")]
    #[validate(range(min = 1))]
    pub max_char_run: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Service name for logs and health checks
    #[serde(default = "default_service_name")]
    #[validate(length(min = 1))]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 5 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_max_concurrent() -> usize { 256 }
fn default_max_body_bytes() -> usize { 2 * 1024 * 1024 }
fn default_alpha() -> f64 { 0.7 }
fn default_dedup_threshold() -> f64 { 0.85 }
fn default_shingle_size() -> usize { 5 }
fn default_max_candidates() -> usize { 100 }
fn default_limit() -> usize { 10 }
fn default_max_limit() -> usize { 50 }
fn default_threshold() -> f64 { 0.7 }
fn default_min_chars() -> usize { 20 }
fn default_max_chars() -> usize { 5000 }
fn default_min_words() -> usize { 4 }
fn default_min_word_count_ratio() -> f64 { 0.5 }
fn default_min_alpha_ratio() -> f64 { 0.6 }
fn default_max_symbol_ratio() -> f64 { 0.3 }
fn default_max_token_run() -> usize { 3 }
fn default_max_char_run() -> usize { 5 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_service_name() -> String { crate::SERVICE_NAME.to_string() }

fn validate_limits(config: &RerankConfig) -> std::result::Result<(), ValidationError> {
    if config.default_limit > config.max_limit {
        let mut err = ValidationError::new("default_limit_exceeds_max_limit");
        err.message = Some("rerank.default_limit must not exceed rerank.max_limit".into());
        return Err(err);
    }
    Ok(())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            max_concurrent_requests: default_max_concurrent(),
            max_body_bytes: default_max_body_bytes(),
            workers: 0,
        }
    }
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            dedup_threshold: default_dedup_threshold(),
            shingle_size: default_shingle_size(),
            max_candidates: default_max_candidates(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            default_threshold: default_threshold(),
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            max_chars: default_max_chars(),
            min_words: default_min_words(),
            min_word_count_ratio: default_min_word_count_ratio(),
            min_alpha_ratio: default_min_alpha_ratio(),
            max_symbol_ratio: default_max_symbol_ratio(),
            max_token_run: default_max_token_run(),
            max_char_run: default_max_char_run(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            service_name: default_service_name(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files, then validate it
    pub fn load() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__RERANK__ALPHA=0.6
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_source(config)
    }

    fn from_source(config: Config) -> Result<Self> {
        let config: AppConfig = config.try_deserialize()?;
        config.validate().map_err(|e| AppError::Configuration {
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Number of rerank workers, resolving `0` to the available core count
    pub fn worker_count(&self) -> usize {
        match self.server.workers {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use tokio_test::{assert_err, assert_ok};

    fn from_toml(toml: &str) -> Result<AppConfig> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        AppConfig::from_source(config)
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.rerank.alpha, 0.7);
        assert_eq!(config.rerank.max_candidates, 100);
        assert_eq!(config.rerank.default_limit, 10);
        assert_eq!(config.quality.min_alpha_ratio, 0.6);
        assert_ok!(config.validate());
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let config = assert_ok!(from_toml(""));
        assert_eq!(config.rerank.shingle_size, 5);
        assert_eq!(config.observability.service_name, crate::SERVICE_NAME);
    }

    #[test]
    fn test_partial_override() {
        let config = assert_ok!(from_toml(
            "[rerank]\nalpha = 0.5\n\n[quality]\nmin_words = 2\n"
        ));
        assert_eq!(config.rerank.alpha, 0.5);
        assert_eq!(config.rerank.dedup_threshold, 0.85);
        assert_eq!(config.quality.min_words, 2);
        assert_eq!(config.quality.max_chars, 5000);
    }

    #[test]
    fn test_out_of_range_alpha_rejected() {
        let err = assert_err!(from_toml("[rerank]\nalpha = 1.5\n"));
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_default_limit_above_max_rejected() {
        let err = assert_err!(from_toml(
            "[rerank]\ndefault_limit = 80\nmax_limit = 50\n"
        ));
        assert!(err.to_string().contains("default_limit"));
    }

    #[test]
    fn test_worker_count_resolves_auto() {
        let mut config = AppConfig::default();
        assert!(config.worker_count() >= 1);
        config.server.workers = 3;
        assert_eq!(config.worker_count(), 3);
    }
}
