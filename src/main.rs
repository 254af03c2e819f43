//! # Gutenberg Chunker CLI (`gbchunk`)
//!
//! Imports Project Gutenberg books into SQLite and splits their bodies
//! into paragraph chunks, one transaction per book.
//!
//! ## Usage
//!
//! ```bash
//! gbchunk --config ./config/gbchunk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gbchunk init` | Create the SQLite database and schema |
//! | `gbchunk import` | Load books from a Gutenberg mirror |
//! | `gbchunk chunk` | Chunk every stored book (or `--id` ones) |
//! | `gbchunk get <id>` | Show a book and its chunks |
//! | `gbchunk stats` | Document and chunk counts |
//!
//! Logs go to stderr and honour `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use gutenberg_chunker::batch::{self, BatchOptions};
use gutenberg_chunker::progress::ProgressMode;
use gutenberg_chunker::{config, get, import, migrate, stats};

/// Gutenberg Chunker: strip Project Gutenberg boilerplate and store
/// paragraph-sized chunks for indexing or embedding.
#[derive(Parser)]
#[command(
    name = "gbchunk",
    about = "Gutenberg Chunker: split Project Gutenberg books into paragraph chunks",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/gbchunk.toml")]
    config: PathBuf,

    /// Progress output on stderr.
    #[arg(long, global = true, value_enum, default_value = "auto")]
    progress: ProgressMode,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `documents` and `chunks`
    /// tables. Running it again is safe.
    Init,

    /// Import books from a Gutenberg mirror.
    ///
    /// Walks the import root, reads the text entry of each archive, scrapes
    /// title and author, and stores the raw text as a document.
    Import {
        /// Mirror root; overrides `[import].root`.
        #[arg(long)]
        root: Option<PathBuf>,

        /// Maximum number of files to process.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Chunk stored books.
    ///
    /// Each book is read, stripped of its header and footer, split into
    /// paragraphs, and its chunks are inserted in a single transaction.
    /// A failing book is rolled back and reported; the run continues.
    Chunk {
        /// Only chunk these document ids (repeatable).
        #[arg(long = "id")]
        ids: Vec<i64>,

        /// Maximum number of documents to process.
        #[arg(long)]
        limit: Option<usize>,

        /// Delete a book's existing chunks before inserting new ones.
        #[arg(long)]
        replace: bool,

        /// Stop at the first failing book.
        #[arg(long)]
        fail_fast: bool,

        /// Override `[chunking].min_chars`.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        min_chars: Option<u64>,

        /// Per-book deadline in seconds; overrides `[batch].document_timeout_secs`.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: Option<u64>,
    },

    /// Show a document and its chunks.
    Get {
        /// Document id.
        id: i64,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show database statistics.
    Stats,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_config(&cli.config)?;
    let reporter = cli.progress.reporter();

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { root, limit } => {
            import::run_import(&cfg, root, limit, reporter.as_ref()).await?;
        }
        Commands::Chunk {
            ids,
            limit,
            replace,
            fail_fast,
            min_chars,
            timeout_secs,
        } => {
            let mut chunk = cfg.chunking.options();
            chunk.replace_existing |= replace;
            if let Some(min) = min_chars {
                chunk.min_chars = min as usize;
            }

            let options = BatchOptions {
                ids: if ids.is_empty() { None } else { Some(ids) },
                limit,
                fail_fast: fail_fast || cfg.batch.fail_fast,
                document_timeout: timeout_secs
                    .map(Duration::from_secs)
                    .or_else(|| cfg.batch.document_timeout()),
                chunk,
            };
            batch::run_chunk(&cfg, options, reporter.as_ref()).await?;
        }
        Commands::Get { id, json } => {
            get::run_get(&cfg, id, json).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
