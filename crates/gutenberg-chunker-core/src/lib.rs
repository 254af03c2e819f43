//! # Gutenberg Chunker Core
//!
//! Pure logic for turning Project Gutenberg plain-text books into
//! paragraph-sized chunks: boundary detection, paragraph accumulation,
//! metadata scraping, the store abstraction, and the transactional
//! per-document chunking pipeline.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. Storage backends
//! live behind the [`store::Store`] trait.

pub mod boundary;
pub mod chunk;
pub mod error;
pub mod metadata;
pub mod models;
pub mod pipeline;
pub mod store;

pub use error::ChunkError;
pub use pipeline::{chunk_document, ChunkOptions};
