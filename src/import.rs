//! Book importer.
//!
//! Walks a Gutenberg mirror, reads each book's plain text and stores it
//! as a [`NewDocument`]. Header/footer markers are kept intact: stripping
//! them is the chunker's job.
//!
//! - `.zip` archives: only the first entry is considered, and only when
//!   it is a `.txt` file. Mirror archives carry the book first and images
//!   or alternate encodings after it.
//! - `.txt` files are read as-is.
//!
//! Bytes are decoded as UTF-8, replacing invalid sequences.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use gutenberg_chunker_core::metadata::extract_metadata;
use gutenberg_chunker_core::models::NewDocument;
use gutenberg_chunker_core::store::Store;

use crate::config::{Config, ImportConfig};
use crate::db;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::sqlite_store::SqliteStore;

/// Largest up-front buffer reserved for an archive entry.
const MAX_CAPACITY_HINT: u64 = 64 * 1024 * 1024;

/// Counts reported at the end of an import.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub found: u64,
    pub imported: u64,
    pub skipped_existing: u64,
    pub skipped_unsupported: u64,
}

/// A book read from disk, before it is stored.
#[derive(Debug, Clone)]
pub struct BookFile {
    /// Name of the text file (archive entry name or file name).
    pub filename: String,
    pub content: String,
}

/// Find candidate files under `import.root`, sorted by relative path.
pub fn scan_books(import: &ImportConfig) -> Result<Vec<PathBuf>> {
    let root = &import.root;
    if !root.exists() {
        bail!("Import root does not exist: {}", root.display());
    }

    let include_set = build_globset(&import.include_globs)?;
    let exclude_set = build_globset(&import.exclude_globs)?;

    let mut paths = Vec::new();
    for entry in WalkDir::new(root).follow_links(import.follow_symlinks) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }
        paths.push(path.to_path_buf());
    }

    paths.sort();
    Ok(paths)
}

/// Read the book text out of an archive or plain file.
///
/// Returns `Ok(None)` when the file holds no importable text.
pub fn read_book(path: &Path) -> Result<Option<BookFile>> {
    let is_zip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);

    if is_zip {
        return read_first_archive_entry(path);
    }

    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(Some(BookFile {
        filename,
        content: String::from_utf8_lossy(&bytes).into_owned(),
    }))
}

fn read_first_archive_entry(path: &Path) -> Result<Option<BookFile>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read archive {}", path.display()))?;

    if archive.is_empty() {
        return Ok(None);
    }

    let mut entry = archive.by_index(0)?;
    let name = entry.name().to_string();
    if !name.to_ascii_lowercase().ends_with(".txt") {
        tracing::debug!(archive = %path.display(), entry = %name, "skipping non-text entry");
        return Ok(None);
    }

    let mut bytes = Vec::with_capacity(capacity_hint(entry.size()));
    entry.read_to_end(&mut bytes)?;

    Ok(Some(BookFile {
        filename: name,
        content: String::from_utf8_lossy(&bytes).into_owned(),
    }))
}

// The archive header's size is untrusted; it only sizes the first allocation.
fn capacity_hint(declared: u64) -> usize {
    declared.min(MAX_CAPACITY_HINT) as usize
}

/// Turn a raw book into a document, scraping title and author.
pub fn to_new_document(book: BookFile) -> NewDocument {
    let meta = extract_metadata(&book.content);
    NewDocument {
        name: meta.title.unwrap_or_else(|| book.filename.clone()),
        author: meta.author.unwrap_or_default(),
        filename: book.filename,
        content: book.content,
    }
}

/// Import every book under `import.root` into `store`.
pub async fn import_books(
    store: &dyn Store,
    import: &ImportConfig,
    limit: Option<usize>,
    reporter: &dyn ProgressReporter,
) -> Result<ImportSummary> {
    let mut paths = scan_books(import)?;
    if let Some(lim) = limit {
        paths.truncate(lim);
    }

    let mut summary = ImportSummary {
        found: paths.len() as u64,
        ..ImportSummary::default()
    };

    for path in &paths {
        let book = match read_book(path)? {
            Some(book) => book,
            None => {
                summary.skipped_unsupported += 1;
                continue;
            }
        };

        if import.skip_existing && store.find_document_by_filename(&book.filename).await?.is_some()
        {
            summary.skipped_existing += 1;
            continue;
        }

        let doc = to_new_document(book);
        let id = store
            .insert_document(&doc)
            .await
            .with_context(|| format!("Failed to store {}", path.display()))?;
        tracing::debug!(document_id = id, filename = %doc.filename, "imported");

        summary.imported += 1;
        reporter.report(ProgressEvent::Importing {
            n: summary.imported,
        });
    }

    Ok(summary)
}

/// CLI entry point for `gbchunk import`.
///
/// `root` overrides `[import].root`; one of the two must be present.
pub async fn run_import(
    config: &Config,
    root: Option<PathBuf>,
    limit: Option<usize>,
    reporter: &dyn ProgressReporter,
) -> Result<()> {
    let import = match (root, &config.import) {
        (Some(root), Some(cfg)) => ImportConfig {
            root,
            ..cfg.clone()
        },
        (Some(root), None) => ImportConfig::with_root(root),
        (None, Some(cfg)) => cfg.clone(),
        (None, None) => bail!("No import root: pass --root or set [import].root in the config"),
    };

    let store = SqliteStore::new(db::connect(config).await?);
    let summary = import_books(&store, &import, limit, reporter).await;
    reporter.report(ProgressEvent::Finished);
    store.close().await;
    let summary = summary?;

    println!("import {}", import.root.display());
    println!("  files found: {}", summary.found);
    println!("  imported: {}", summary.imported);
    println!("  skipped (already stored): {}", summary.skipped_existing);
    println!("  skipped (no text entry): {}", summary.skipped_unsupported);
    println!("ok");
    Ok(())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
