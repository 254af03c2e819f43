//! Core data models shared by the pipeline and the storage backends.

use serde::Serialize;

/// A stored source book. Read-only from the chunker's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub filename: String,
    pub content: String,
}

/// A book about to be inserted by the importer. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDocument {
    pub name: String,
    pub author: String,
    pub filename: String,
    pub content: String,
}

/// One accepted paragraph, persisted with a reference to its source book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub id: i64,
    pub source_id: i64,
    pub text: String,
}
