//! Asynchronous batch import strategy
//!
//! This module provides a multi-threaded implementation of the ImportStrategy
//! trait. Lines are read in batches and each batch is decoded in parallel.
//!
//! # Architecture
//!
//! ```text
//! AsyncImportStrategy
//!     ├── BatchConfig (batch_size, worker_threads)
//!     ├── AsyncLineReader (batch line reading over tokio::fs::File)
//!     ├── decode_batch (one tokio task per chunk of the batch)
//!     └── ImportSession (in-order fold, then OrderService::commit)
//! ```
//!
//! # Ordering
//!
//! Decoding is independent per line, so chunks run concurrently. Folding is
//! not: totals and first-seen order depend on line order. Decoded chunks are
//! therefore awaited in the order they were spawned and fed to the session
//! sequentially, which keeps results identical to the sync strategy.

use crate::core::{ImportSession, OrderService};
use crate::io::async_reader::AsyncLineReader;
use crate::io::fixed_width::RecordParser;
use crate::io::sync_reader::open_error;
use crate::strategy::ImportStrategy;
use crate::types::{ImportResult, Legacy, OrderError, RecordError};
use std::path::Path;
use tokio_util::compat::TokioAsyncReadCompatExt;

/// Default number of lines per batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Largest accepted batch size
pub const MAX_BATCH_SIZE: usize = 100_000;

/// Configuration for batch importing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of lines per batch
    pub batch_size: usize,
    /// Number of runtime worker threads, also the number of decode chunks
    pub worker_threads: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            worker_threads: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults; batch sizes above
    /// [`MAX_BATCH_SIZE`] are clamped.
    pub fn new(batch_size: usize, worker_threads: usize) -> Self {
        let default = Self::default();

        let batch_size = match batch_size {
            0 => {
                tracing::warn!(
                    batch_size,
                    default = default.batch_size,
                    "invalid batch size, using default"
                );
                default.batch_size
            }
            n if n > MAX_BATCH_SIZE => {
                tracing::warn!(batch_size, max = MAX_BATCH_SIZE, "batch size clamped");
                MAX_BATCH_SIZE
            }
            n => n,
        };

        let worker_threads = if worker_threads == 0 {
            tracing::warn!(
                worker_threads,
                default = default.worker_threads,
                "invalid worker thread count, using default"
            );
            default.worker_threads
        } else {
            worker_threads
        };

        Self {
            batch_size,
            worker_threads,
        }
    }
}

/// Asynchronous batch import strategy
#[derive(Debug, Clone)]
pub struct AsyncImportStrategy {
    config: BatchConfig,
}

impl AsyncImportStrategy {
    /// Create a new AsyncImportStrategy with the specified configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    async fn run(
        &self,
        service: &OrderService,
        input_path: &Path,
        has_header: bool,
    ) -> Result<ImportResult, OrderError> {
        let file = tokio::fs::File::open(input_path)
            .await
            .map_err(|e| open_error(input_path, e))?;
        let mut reader =
            AsyncLineReader::new(futures::io::BufReader::new(file.compat()), has_header);

        let mut session = ImportSession::new();
        let parser = session.parser().clone();

        loop {
            let batch = reader.read_batch(self.config.batch_size).await?;
            if batch.is_empty() {
                break;
            }

            let decoded = decode_batch(&parser, batch, self.config.worker_threads).await?;
            for (line, result) in decoded {
                session.feed_decoded(line, result)?;
            }
        }

        service.commit(session)
    }
}

impl ImportStrategy for AsyncImportStrategy {
    fn import(
        &self,
        service: &OrderService,
        input_path: &Path,
        has_header: bool,
    ) -> Result<ImportResult, OrderError> {
        tracing::info!(
            path = %input_path.display(),
            strategy = "async",
            batch_size = self.config.batch_size,
            worker_threads = self.config.worker_threads,
            "import started"
        );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads)
            .build()
            .map_err(|e| OrderError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(self.run(service, input_path, has_header))
    }
}

type DecodedLine = (u64, Result<Legacy, RecordError>);

/// Decode a batch on up to `workers` tasks, preserving line order
async fn decode_batch(
    parser: &RecordParser,
    batch: Vec<(u64, String)>,
    workers: usize,
) -> Result<Vec<DecodedLine>, OrderError> {
    let chunk_size = batch.len().div_ceil(workers.max(1));
    let mut lines = batch.into_iter();
    let mut handles = Vec::new();

    loop {
        let chunk: Vec<_> = lines.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        let parser = parser.clone();
        handles.push(tokio::spawn(async move {
            chunk
                .into_iter()
                .map(|(line, text)| (line, parser.parse(&text)))
                .collect::<Vec<_>>()
        }));
    }

    let mut decoded = Vec::new();
    for handle in handles {
        let chunk = handle.await.map_err(|e| OrderError::IoError {
            message: format!("Decode task failed: {}", e),
        })?;
        decoded.extend(chunk);
    }
    Ok(decoded)
}
