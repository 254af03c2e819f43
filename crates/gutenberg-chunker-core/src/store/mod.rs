//! Storage abstraction for Gutenberg Chunker.
//!
//! The [`Store`] trait covers the document and chunk tables the pipeline
//! reads and writes. Chunk writes only happen through a
//! [`StoreTransaction`], so a document's chunks are committed together or
//! not at all.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Chunk, Document, NewDocument};

/// Abstract storage backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`begin`](Store::begin) | Open a transaction for one document |
/// | [`insert_document`](Store::insert_document) | Add an imported book |
/// | [`find_document_by_filename`](Store::find_document_by_filename) | Import dedup lookup |
/// | [`list_document_ids`](Store::list_document_ids) | All document ids, ascending |
/// | [`get_document`](Store::get_document) | Fetch a book by id |
/// | [`get_chunks`](Store::get_chunks) | Chunks of a book, in insertion order |
/// | [`count_documents`](Store::count_documents) / [`count_chunks`](Store::count_chunks) | Totals |
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a transaction. Dropping it without commit discards its writes.
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTransaction + 'a>>;

    /// Insert a book, returning its assigned id.
    async fn insert_document(&self, doc: &NewDocument) -> Result<i64>;

    async fn find_document_by_filename(&self, filename: &str) -> Result<Option<i64>>;

    async fn list_document_ids(&self) -> Result<Vec<i64>>;

    async fn get_document(&self, id: i64) -> Result<Option<Document>>;

    async fn get_chunks(&self, source_id: i64) -> Result<Vec<Chunk>>;

    async fn count_documents(&self) -> Result<i64>;

    async fn count_chunks(&self) -> Result<i64>;
}

/// A unit of work against the store.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn fetch_document(&mut self, id: i64) -> Result<Option<Document>>;

    async fn insert_chunk(&mut self, source_id: i64, text: &str) -> Result<()>;

    /// Remove every chunk of a document. Returns the number removed.
    async fn delete_chunks(&mut self, source_id: i64) -> Result<u64>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
