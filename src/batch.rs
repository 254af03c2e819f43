//! Batch chunking orchestration.
//!
//! Runs [`chunk_document`] once per document id, one document at a time.
//! Each call is its own transaction, so a failing book is rolled back,
//! logged, and skipped while the run moves on. With `fail_fast` the first
//! failure ends the run instead.
//!
//! Two kinds of cancellation are supported:
//!
//! - a per-document deadline: the in-flight transaction is dropped
//!   (rolled back) and the document counts as failed with
//!   [`ChunkError::Cancelled`];
//! - a shutdown signal (Ctrl-C from the CLI): the in-flight document is
//!   rolled back the same way and the run stops.

use anyhow::{bail, Result};
use std::future::Future;
use std::time::Duration;

use gutenberg_chunker_core::store::Store;
use gutenberg_chunker_core::{chunk_document, ChunkError, ChunkOptions};

use crate::config::Config;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::sqlite_store::SqliteStore;
use crate::db;

/// Settings for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Only these ids. `None` means every stored document.
    pub ids: Option<Vec<i64>>,
    pub limit: Option<usize>,
    pub fail_fast: bool,
    pub document_timeout: Option<Duration>,
    pub chunk: ChunkOptions,
}

/// A document that could not be chunked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub document_id: i64,
    pub kind: &'static str,
    pub message: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: u64,
    pub processed: u64,
    pub succeeded: u64,
    pub chunks_written: u64,
    pub failed: Vec<Failure>,
    /// The run was stopped by the shutdown signal.
    pub interrupted: bool,
}

enum Step {
    Done(Result<usize, ChunkError>),
    Shutdown,
}

/// Chunk every selected document in `store`.
///
/// `shutdown` resolves when the run should stop; pass
/// `std::future::pending()` for none.
pub async fn run_batch<F>(
    store: &dyn Store,
    options: &BatchOptions,
    reporter: &dyn ProgressReporter,
    shutdown: F,
) -> Result<BatchSummary>
where
    F: Future<Output = ()>,
{
    let mut ids = match &options.ids {
        Some(ids) => ids.clone(),
        None => store.list_document_ids().await?,
    };
    if let Some(lim) = options.limit {
        ids.truncate(lim);
    }

    let mut summary = BatchSummary {
        total: ids.len() as u64,
        ..BatchSummary::default()
    };

    tokio::pin!(shutdown);

    for id in ids {
        let step = tokio::select! {
            res = chunk_with_deadline(store, id, options) => Step::Done(res),
            _ = &mut shutdown => Step::Shutdown,
        };

        let result = match step {
            Step::Done(res) => res,
            Step::Shutdown => {
                tracing::warn!(document_id = id, "interrupted; transaction rolled back");
                summary.interrupted = true;
                break;
            }
        };

        summary.processed += 1;
        match result {
            Ok(written) => {
                summary.succeeded += 1;
                summary.chunks_written += written as u64;
            }
            Err(err) => {
                tracing::warn!(
                    document_id = id,
                    kind = err.kind(),
                    error = %err,
                    "chunking failed; transaction rolled back"
                );
                let failure = Failure {
                    document_id: id,
                    kind: err.kind(),
                    message: err.to_string(),
                };
                summary.failed.push(failure);
                if options.fail_fast {
                    reporter.report(ProgressEvent::Finished);
                    bail!("document {}: {}", id, err);
                }
            }
        }

        reporter.report(ProgressEvent::Chunking {
            n: summary.processed,
            total: summary.total,
        });
    }

    reporter.report(ProgressEvent::Finished);
    Ok(summary)
}

async fn chunk_with_deadline(
    store: &dyn Store,
    id: i64,
    options: &BatchOptions,
) -> Result<usize, ChunkError> {
    match options.document_timeout {
        Some(limit) => tokio::time::timeout(limit, chunk_document(store, id, &options.chunk))
            .await
            .unwrap_or(Err(ChunkError::Cancelled)),
        None => chunk_document(store, id, &options.chunk).await,
    }
}

/// CLI entry point for `gbchunk chunk`.
pub async fn run_chunk(
    config: &Config,
    options: BatchOptions,
    reporter: &dyn ProgressReporter,
) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let summary = run_batch(&store, &options, reporter, shutdown).await;
    store.close().await;
    let summary = summary?;

    println!("chunk");
    println!("  documents: {}", summary.total);
    println!("  processed: {}", summary.processed);
    println!("  succeeded: {}", summary.succeeded);
    println!("  failed: {}", summary.failed.len());
    println!("  chunks written: {}", summary.chunks_written);
    for failure in &summary.failed {
        println!(
            "  ! document {} ({}): {}",
            failure.document_id, failure.kind, failure.message
        );
    }

    if summary.interrupted {
        bail!(
            "interrupted after {} of {} documents",
            summary.processed,
            summary.total
        );
    }
    if !summary.failed.is_empty() {
        bail!("{} document(s) failed", summary.failed.len());
    }

    println!("ok");
    Ok(())
}
