use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    create_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create all tables and indexes. Safe to run repeatedly.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL DEFAULT '',
            author TEXT NOT NULL DEFAULT '',
            filename TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL,
            imported_at INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Insertion order (rowid) is the only ordering of a document's chunks.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            id INTEGER PRIMARY KEY,
            text TEXT NOT NULL,
            source_id INTEGER NOT NULL,
            FOREIGN KEY (source_id) REFERENCES documents(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_source_id ON chunks(source_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_filename ON documents(filename)")
        .execute(pool)
        .await?;

    Ok(())
}
