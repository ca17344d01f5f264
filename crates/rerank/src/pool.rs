//! Blocking worker pool for the CPU-bound pipeline
//!
//! Every rerank runs on tokio's blocking thread pool; a semaphore sized to the
//! configured worker count caps how many run at once so request tasks queue
//! instead of oversubscribing cores.

use crate::pipeline::{self, EngineConfig, RawRerankRequest, RerankOutcome};
use docrank_common::errors::{AppError, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::error;

#[derive(Clone)]
pub struct RerankPool {
    permits: Arc<Semaphore>,
    engine: Arc<EngineConfig>,
    workers: usize,
}

impl RerankPool {
    pub fn new(engine: EngineConfig, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            engine: Arc::new(engine),
            workers,
        }
    }

    /// Number of pipelines allowed to run concurrently
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Worker slots not currently in use
    pub fn idle_workers(&self) -> usize {
        self.permits.available_permits()
    }

    /// Rerank one request on a worker
    pub async fn run(&self, raw: RawRerankRequest) -> Result<RerankOutcome> {
        let engine = Arc::clone(&self.engine);
        self.execute(move || pipeline::rerank(raw, &engine)).await
    }

    pub(crate) async fn execute<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| AppError::internal("Rerank worker pool is closed"))?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => {
                error!(error = %e, "Rerank worker panicked");
                Err(AppError::processing("Rerank worker panicked"))
            }
            Err(e) => Err(AppError::internal(format!("Rerank worker failed: {e}"))),
        }
    }

    /// Refuse new work; queued and in-flight jobs finish normally
    pub fn close(&self) {
        self.permits.close();
    }
}
