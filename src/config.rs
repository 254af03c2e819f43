//! TOML configuration.
//!
//! ```toml
//! [db]
//! path = "./data/gutenberg.sqlite"
//!
//! [chunking]
//! min_chars = 300
//! replace_existing = false
//!
//! [batch]
//! fail_fast = false
//! document_timeout_secs = 30
//!
//! [import]
//! root = "/mnt/gutenberg/aleph.gutenberg.org"
//! include_globs = ["**/*.zip", "**/*.txt"]
//! exclude_globs = ["**/*-8.zip", "**/*-0.zip", "**/*-8.txt", "**/*-0.txt"]
//! ```
//!
//! Only `[db]` is required. See [`load_config`] for validation rules.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gutenberg_chunker_core::chunk::DEFAULT_MIN_CHARS;
use gutenberg_chunker_core::ChunkOptions;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub import: Option<ImportConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    #[serde(default)]
    pub replace_existing: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            replace_existing: false,
        }
    }
}

fn default_min_chars() -> usize {
    DEFAULT_MIN_CHARS
}

impl ChunkingConfig {
    pub fn options(&self) -> ChunkOptions {
        ChunkOptions {
            min_chars: self.min_chars,
            replace_existing: self.replace_existing,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BatchConfig {
    #[serde(default)]
    pub fail_fast: bool,
    /// Per-document deadline. Unset means no deadline.
    #[serde(default)]
    pub document_timeout_secs: Option<u64>,
}

impl BatchConfig {
    pub fn document_timeout(&self) -> Option<Duration> {
        self.document_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default = "default_exclude_globs")]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default = "default_skip_existing")]
    pub skip_existing: bool,
}

impl ImportConfig {
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            root,
            include_globs: default_include_globs(),
            exclude_globs: default_exclude_globs(),
            follow_symlinks: false,
            skip_existing: default_skip_existing(),
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.zip".to_string(), "**/*.txt".to_string()]
}

// Gutenberg mirrors ship each book several times; "-8" (latin-1) and
// "-0" (utf-8) copies, zipped or loose, duplicate the plain ASCII one.
fn default_exclude_globs() -> Vec<String> {
    vec![
        "**/*-8.zip".to_string(),
        "**/*-0.zip".to_string(),
        "**/*-8.txt".to_string(),
        "**/*-0.txt".to_string(),
    ]
}

fn default_skip_existing() -> bool {
    true
}

impl Config {
    /// Config used when no file is given: a database under `./data`.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/gutenberg.sqlite"),
            },
            chunking: ChunkingConfig::default(),
            batch: BatchConfig::default(),
            import: None,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.min_chars == 0 {
        anyhow::bail!("chunking.min_chars must be > 0");
    }

    if config.batch.document_timeout_secs == Some(0) {
        anyhow::bail!("batch.document_timeout_secs must be > 0 when set");
    }

    if let Some(import) = &config.import {
        if import.include_globs.is_empty() {
            anyhow::bail!("import.include_globs must not be empty");
        }
    }

    Ok(())
}
