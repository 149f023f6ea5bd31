//! Shared types, error model, and configuration for literate.
//!
//! This crate is the foundation depended on by all other literate crates.
//! It provides:
//! - [`LiterateError`], the unified error type
//! - Domain types ([`Target`], [`Chunk`], [`Notebook`], [`RenderedDocument`])
//! - Configuration ([`AppConfig`], [`GenerateConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, DefaultsConfig, GenerateConfig, KernelConfig, MarkdownConfig,
    NotebookConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{LiterateError, Result, Step};
pub use types::{
    Cell, Chunk, ChunkKind, KernelSpec, LanguageInfo, NBFORMAT, NBFORMAT_MINOR, Notebook,
    NotebookMetadata, RenderedDocument, Target,
};
