//! SQLite-backed [`Store`] implementation.
//!
//! Maps each [`Store`] operation onto the `documents` and `chunks` tables
//! created by [`migrate`](crate::migrate). A [`SqliteTransaction`] owns a
//! pooled connection for its lifetime; sqlx rolls it back on drop unless it
//! was committed.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Row, SqlitePool, Transaction};

use gutenberg_chunker_core::models::{Chunk, Document, NewDocument};
use gutenberg_chunker_core::store::{Store, StoreTransaction};

const SELECT_DOCUMENT: &str =
    "SELECT id, name, author, filename, content FROM documents WHERE id = ?";

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// An open write transaction for one document.
pub struct SqliteTransaction {
    tx: Transaction<'static, Sqlite>,
}

// Databases written by older tooling may hold NULL metadata.
fn document_from_row(row: &SqliteRow) -> Document {
    Document {
        id: row.get("id"),
        name: row.get::<Option<String>, _>("name").unwrap_or_default(),
        author: row.get::<Option<String>, _>("author").unwrap_or_default(),
        filename: row.get::<Option<String>, _>("filename").unwrap_or_default(),
        content: row.get::<Option<String>, _>("content").unwrap_or_default(),
    }
}

#[async_trait]
impl StoreTransaction for SqliteTransaction {
    async fn fetch_document(&mut self, id: i64) -> Result<Option<Document>> {
        let row = sqlx::query(SELECT_DOCUMENT)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.as_ref().map(document_from_row))
    }

    async fn insert_chunk(&mut self, source_id: i64, text: &str) -> Result<()> {
        sqlx::query("INSERT INTO chunks (source_id, text) VALUES (?, ?)")
            .bind(source_id)
            .bind(text)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_chunks(&mut self, source_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chunks WHERE source_id = ?")
            .bind(source_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTransaction + 'a>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTransaction { tx }))
    }

    async fn insert_document(&self, doc: &NewDocument) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO documents (name, author, filename, content, imported_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&doc.name)
        .bind(&doc.author)
        .bind(&doc.filename)
        .bind(&doc.content)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn find_document_by_filename(&self, filename: &str) -> Result<Option<i64>> {
        let id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM documents WHERE filename = ? LIMIT 1")
                .bind(filename)
                .fetch_optional(&self.pool)
                .await?;
        Ok(id)
    }

    async fn list_document_ids(&self) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM documents ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn get_document(&self, id: i64) -> Result<Option<Document>> {
        let row = sqlx::query(SELECT_DOCUMENT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(document_from_row))
    }

    async fn get_chunks(&self, source_id: i64) -> Result<Vec<Chunk>> {
        let rows = sqlx::query("SELECT id, source_id, text FROM chunks WHERE source_id = ? ORDER BY id")
            .bind(source_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| Chunk {
                id: row.get("id"),
                source_id: row.get("source_id"),
                text: row.get("text"),
            })
            .collect())
    }

    async fn count_documents(&self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn count_chunks(&self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
