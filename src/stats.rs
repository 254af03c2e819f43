//! Database statistics.
//!
//! A quick summary of what's stored: documents, chunks, books that
//! produced no chunks (usually a missing `*** START` marker), and when the
//! last import ran.

use anyhow::Result;

use crate::config::Config;
use crate::db;

/// Counts shown by `gbchunk stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub documents: i64,
    pub chunks: i64,
    pub documents_without_chunks: i64,
    pub last_import_ts: Option<i64>,
}

pub async fn collect_stats(pool: &sqlx::SqlitePool) -> Result<Stats> {
    let documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(pool)
        .await?;

    let chunks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
        .fetch_one(pool)
        .await?;

    let documents_without_chunks: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM documents d WHERE NOT EXISTS (SELECT 1 FROM chunks c WHERE c.source_id = d.id)",
    )
    .fetch_one(pool)
    .await?;

    let last_import_ts: Option<i64> = sqlx::query_scalar("SELECT MAX(imported_at) FROM documents")
        .fetch_one(pool)
        .await?;

    Ok(Stats {
        documents,
        chunks,
        documents_without_chunks,
        last_import_ts,
    })
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let stats = collect_stats(&pool).await;
    pool.close().await;
    let stats = stats?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Gutenberg Chunker — Database Stats");
    println!("==================================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Documents:   {}", stats.documents);
    println!("  Chunks:      {}", stats.chunks);
    println!("  Unchunked:   {}", stats.documents_without_chunks);
    println!(
        "  Last import: {}",
        stats
            .last_import_ts
            .map(format_ts_relative)
            .unwrap_or_else(|| "never".to_string())
    );
    println!();

    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Format a Unix timestamp as a relative time string (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let delta = now - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
