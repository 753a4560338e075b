// crates/heatrisk-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeatError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("invalid glob pattern: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("failed to read directory entry: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pipeline config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("no input tables found in {}", dir.display())]
    EmptyInput { dir: PathBuf },

    #[error("{table} has no column named {column}")]
    MissingColumn { table: String, column: String },

    #[error("row count mismatch: {left} has {left_rows} rows, {right} has {right_rows}")]
    RowCountMismatch {
        left: String,
        left_rows: usize,
        right: String,
        right_rows: usize,
    },

    #[error("malformed file name {}: {reason}", path.display())]
    MalformedFileName { path: PathBuf, reason: String },

    #[error("'{label}' is not a four-digit year")]
    InvalidYear { label: String },

    #[error("{table} has no row for FID {fid}")]
    UnmatchedKey { table: String, fid: String },

    #[error("{table} lists FID {fid} more than once")]
    DuplicateKey { table: String, fid: String },
}

pub type Result<T> = std::result::Result<T, HeatError>;
