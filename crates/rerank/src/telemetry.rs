//! Logging and metrics bootstrap

use anyhow::Context;
use docrank_common::config::ObservabilityConfig;
use docrank_common::metrics::{metric_name, LATENCY_BUCKETS, STAGE_BUCKETS};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log level '{}'", config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logging {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }
    Ok(())
}

fn prometheus_builder() -> anyhow::Result<PrometheusBuilder> {
    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(metric_name("request_duration_seconds")),
            LATENCY_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(metric_name("rerank_stage_duration_seconds")),
            STAGE_BUCKETS,
        )?;
    Ok(builder)
}

/// Install the global Prometheus recorder and return its render handle
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = prometheus_builder()?
        .install_recorder()
        .context("failed to install Prometheus recorder")?;
    Ok(handle)
}

/// Recorder handle not installed globally, for in-process tests
pub fn detached_metrics() -> anyhow::Result<PrometheusHandle> {
    Ok(prometheus_builder()?.build_recorder().handle())
}

/// Periodically drain histogram buffers so `/metrics` rendering stays cheap
pub fn spawn_metrics_upkeep(
    handle: PrometheusHandle,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            handle.run_upkeep();
        }
    })
}
