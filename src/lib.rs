//! # Gutenberg Chunker
//!
//! Turns a Project Gutenberg mirror into paragraph-sized text chunks stored
//! in SQLite, ready for indexing or embedding.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌────────────────────┐   ┌──────────┐
//! │  Mirror  │──▶│   Importer   │──▶│ documents (SQLite) │──▶│  Batch   │
//! │ zip/txt  │   │ title/author │   └────────────────────┘   │ per-book │
//! └──────────┘   └──────────────┘                            │    tx    │
//!                                                            └────┬─────┘
//!                                    ┌────────────────────┐       │
//!                                    │  chunks (SQLite)   │◀──────┘
//!                                    └────────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. The **importer** ([`import`]) walks the mirror and stores each book's
//!    raw text, boilerplate included.
//! 2. The **batch runner** ([`batch`]) calls
//!    [`chunk_document`](gutenberg_chunker_core::chunk_document) once per
//!    book. Boundary detection drops the header and footer, the chunker
//!    keeps paragraphs of at least `min_chars`, and the chunks are written
//!    in one transaction.
//! 3. A failing book is rolled back and logged; the run moves on.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool (WAL, foreign keys) |
//! | [`migrate`] | Schema creation (idempotent) |
//! | [`sqlite_store`] | SQLite implementation of the core `Store` trait |
//! | [`import`] | Mirror walker and archive reader |
//! | [`batch`] | Per-document transactional chunking over the whole store |
//! | [`progress`] | Progress reporting on stderr |
//! | [`stats`] | Document and chunk counts |
//! | [`get`] | Document retrieval by id |

pub mod batch;
pub mod config;
pub mod db;
pub mod get;
pub mod import;
pub mod migrate;
pub mod progress;
pub mod sqlite_store;
pub mod stats;

pub use gutenberg_chunker_core::{chunk_document, ChunkError, ChunkOptions};
pub use gutenberg_chunker_core::{models, store};
