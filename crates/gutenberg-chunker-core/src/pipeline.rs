//! Transactional per-document chunking.
//!
//! [`chunk_document`] reads one book, runs boundary detection and the
//! paragraph chunker over its content, and writes the resulting chunks in
//! a single transaction:
//!
//! ```text
//! begin ─▶ fetch ─▶ chunk ─▶ insert* ─▶ commit
//!   │        │                  │
//!   └────────┴──── error ───────┴──▶ rollback
//! ```
//!
//! Nothing is carried over between calls, so a failure on one document
//! cannot affect another. Dropping the future mid-flight drops the open
//! transaction, which the store discards.

use crate::chunk::{chunk_body, DEFAULT_MIN_CHARS};
use crate::error::ChunkError;
use crate::store::{Store, StoreTransaction};

/// Knobs for [`chunk_document`].
#[derive(Debug, Clone)]
pub struct ChunkOptions {
    /// Paragraphs shorter than this (in bytes, newlines included) are dropped.
    pub min_chars: usize,
    /// Delete the document's existing chunks inside the same transaction
    /// before inserting. Off by default: re-running appends duplicates.
    pub replace_existing: bool,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            replace_existing: false,
        }
    }
}

/// Chunk one document and persist its chunks atomically.
///
/// Returns the number of chunks inserted.
///
/// # Errors
///
/// - [`ChunkError::NotFound`] if `id` does not resolve to a document.
/// - [`ChunkError::Store`] if any read or write fails.
///
/// In both cases the transaction is rolled back before returning.
pub async fn chunk_document<S>(
    store: &S,
    id: i64,
    options: &ChunkOptions,
) -> Result<usize, ChunkError>
where
    S: Store + ?Sized,
{
    let mut tx = store.begin().await?;

    match write_chunks(tx.as_mut(), id, options).await {
        Ok(written) => {
            tx.commit().await?;
            tracing::debug!(document_id = id, chunks = written, "committed");
            Ok(written)
        }
        Err(err) => {
            if let Err(rb) = tx.rollback().await {
                tracing::warn!(document_id = id, error = %rb, "rollback failed");
            }
            Err(err)
        }
    }
}

async fn write_chunks(
    tx: &mut (dyn StoreTransaction + '_),
    id: i64,
    options: &ChunkOptions,
) -> Result<usize, ChunkError> {
    let doc = tx
        .fetch_document(id)
        .await?
        .ok_or(ChunkError::NotFound(id))?;

    if options.replace_existing {
        let removed = tx.delete_chunks(doc.id).await?;
        if removed > 0 {
            tracing::debug!(document_id = id, removed, "replacing existing chunks");
        }
    }

    let mut written = 0;
    for text in chunk_body(&doc.content, options.min_chars) {
        tx.insert_chunk(doc.id, &text).await?;
        written += 1;
    }
    Ok(written)
}
