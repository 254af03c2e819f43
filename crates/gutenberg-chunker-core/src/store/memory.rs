//! In-memory [`Store`] implementation for tests and dry runs.
//!
//! Uses `Vec`s behind `std::sync::RwLock`. Transactions stage their
//! writes locally and apply them under the write lock on commit, so an
//! uncommitted or dropped transaction leaves no trace.
//!
//! Two fault hooks are available for exercising the pipeline's failure
//! paths: [`InMemoryStore::fail_inserts_after`] makes the (n+1)-th chunk
//! insert of a transaction return an error, and
//! [`InMemoryStore::stall_inserts_after`] makes it never complete.

use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::{Chunk, Document, NewDocument};

use super::{Store, StoreTransaction};

#[derive(Debug, Clone, Copy)]
enum InsertFault {
    Fail(usize),
    Stall(usize),
}

/// In-memory store for tests.
pub struct InMemoryStore {
    docs: RwLock<Vec<Document>>,
    chunks: RwLock<Vec<Chunk>>,
    fault: Option<InsertFault>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            chunks: RwLock::new(Vec::new()),
            fault: None,
        }
    }

    /// Error out on every transaction's chunk insert after the first `n` succeed.
    pub fn fail_inserts_after(mut self, n: usize) -> Self {
        self.fault = Some(InsertFault::Fail(n));
        self
    }

    /// Hang forever on every transaction's chunk insert after the first `n` succeed.
    pub fn stall_inserts_after(mut self, n: usize) -> Self {
        self.fault = Some(InsertFault::Stall(n));
        self
    }

    /// Insert a document with a caller-chosen id.
    pub fn with_document(self, doc: Document) -> Self {
        self.docs.write().unwrap().push(doc);
        self
    }

    /// Snapshot of every committed chunk, in insertion order.
    pub fn all_chunks(&self) -> Vec<Chunk> {
        self.chunks.read().unwrap().clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

struct InMemoryTransaction<'a> {
    store: &'a InMemoryStore,
    staged: Vec<(i64, String)>,
    cleared: Vec<i64>,
    inserts: usize,
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction<'_> {
    async fn fetch_document(&mut self, id: i64) -> Result<Option<Document>> {
        let docs = self.store.docs.read().unwrap();
        Ok(docs.iter().find(|d| d.id == id).cloned())
    }

    async fn insert_chunk(&mut self, source_id: i64, text: &str) -> Result<()> {
        match self.store.fault {
            Some(InsertFault::Fail(n)) if self.inserts >= n => {
                bail!("injected insert failure after {} chunks", n)
            }
            Some(InsertFault::Stall(n)) if self.inserts >= n => {
                std::future::pending::<()>().await;
            }
            _ => {}
        }

        let exists = self
            .store
            .docs
            .read()
            .unwrap()
            .iter()
            .any(|d| d.id == source_id);
        if !exists {
            bail!("foreign key violation: no document {}", source_id);
        }

        self.staged.push((source_id, text.to_string()));
        self.inserts += 1;
        Ok(())
    }

    async fn delete_chunks(&mut self, source_id: i64) -> Result<u64> {
        let committed = if self.cleared.contains(&source_id) {
            0
        } else {
            self.store
                .chunks
                .read()
                .unwrap()
                .iter()
                .filter(|c| c.source_id == source_id)
                .count()
        };
        let before = self.staged.len();
        self.staged.retain(|(id, _)| *id != source_id);
        let staged = before - self.staged.len();

        self.cleared.push(source_id);
        Ok((committed + staged) as u64)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTransaction {
            store,
            staged,
            cleared,
            ..
        } = *self;
        let mut chunks = store.chunks.write().unwrap();
        chunks.retain(|c| !cleared.contains(&c.source_id));
        let mut next_id = chunks.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        for (source_id, text) in staged {
            chunks.push(Chunk {
                id: next_id,
                source_id,
                text,
            });
            next_id += 1;
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTransaction + 'a>> {
        Ok(Box::new(InMemoryTransaction {
            store: self,
            staged: Vec::new(),
            cleared: Vec::new(),
            inserts: 0,
        }))
    }

    async fn insert_document(&self, doc: &NewDocument) -> Result<i64> {
        let mut docs = self.docs.write().unwrap();
        let id = docs.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        docs.push(Document {
            id,
            name: doc.name.clone(),
            author: doc.author.clone(),
            filename: doc.filename.clone(),
            content: doc.content.clone(),
        });
        Ok(id)
    }

    async fn find_document_by_filename(&self, filename: &str) -> Result<Option<i64>> {
        let docs = self.docs.read().unwrap();
        Ok(docs.iter().find(|d| d.filename == filename).map(|d| d.id))
    }

    async fn list_document_ids(&self) -> Result<Vec<i64>> {
        let mut ids: Vec<i64> = self.docs.read().unwrap().iter().map(|d| d.id).collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn get_document(&self, id: i64) -> Result<Option<Document>> {
        let docs = self.docs.read().unwrap();
        Ok(docs.iter().find(|d| d.id == id).cloned())
    }

    async fn get_chunks(&self, source_id: i64) -> Result<Vec<Chunk>> {
        let chunks = self.chunks.read().unwrap();
        Ok(chunks
            .iter()
            .filter(|c| c.source_id == source_id)
            .cloned()
            .collect())
    }

    async fn count_documents(&self) -> Result<i64> {
        Ok(self.docs.read().unwrap().len() as i64)
    }

    async fn count_chunks(&self) -> Result<i64> {
        Ok(self.chunks.read().unwrap().len() as i64)
    }
}
