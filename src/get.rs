//! Document retrieval by id.
//!
//! Prints a book's metadata and its chunks in insertion order. Used by the
//! `gbchunk get` command.

use anyhow::{bail, Result};
use serde::Serialize;

use gutenberg_chunker_core::models::Chunk;
use gutenberg_chunker_core::store::Store;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub filename: String,
    pub content_bytes: usize,
    pub chunks: Vec<Chunk>,
}

pub async fn get_document(store: &dyn Store, id: i64) -> Result<DocumentResponse> {
    let doc = match store.get_document(id).await? {
        Some(doc) => doc,
        None => bail!("document not found: {}", id),
    };
    let chunks = store.get_chunks(id).await?;

    Ok(DocumentResponse {
        id: doc.id,
        name: doc.name,
        author: doc.author,
        filename: doc.filename,
        content_bytes: doc.content.len(),
        chunks,
    })
}

pub async fn run_get(config: &Config, id: i64, json: bool) -> Result<()> {
    let store = SqliteStore::new(db::connect(config).await?);
    let doc = get_document(&store, id).await;
    store.close().await;
    let doc = doc?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("--- document ---");
    println!("id: {}", doc.id);
    println!("name: {}", doc.name);
    println!("author: {}", doc.author);
    println!("filename: {}", doc.filename);
    println!("content: {} bytes", doc.content_bytes);
    println!("chunks: {}", doc.chunks.len());

    for (i, chunk) in doc.chunks.iter().enumerate() {
        println!();
        println!("--- chunk {} (id {}) ---", i, chunk.id);
        print!("{}", chunk.text);
    }

    Ok(())
}
