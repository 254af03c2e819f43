use thiserror::Error;

/// Errors returned by [`chunk_document`](crate::pipeline::chunk_document).
///
/// Every variant means the document's transaction was rolled back and no
/// chunk for it was persisted by this call.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("document not found: {0}")]
    NotFound(i64),
    #[error("store error: {0:#}")]
    Store(anyhow::Error),
    #[error("chunking cancelled")]
    Cancelled,
}

impl From<anyhow::Error> for ChunkError {
    fn from(err: anyhow::Error) -> Self {
        ChunkError::Store(err)
    }
}

impl ChunkError {
    /// Short machine-friendly kind name, used in logs and JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ChunkError::NotFound(_) => "not_found",
            ChunkError::Store(_) => "store",
            ChunkError::Cancelled => "cancelled",
        }
    }
}
