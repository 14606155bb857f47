//! Errors surfaced by the fieldrank CLI.
//!
//! The ranking engine itself never fails on data; everything here comes from
//! reading input, loading config, or writing results.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config at {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config file already exists at {}", .0.display())]
    ConfigExists(PathBuf),

    #[error("HOME environment variable not set")]
    NoHome,

    #[error("Input looks like JSON but failed to parse: {0}")]
    InputJson(#[source] serde_json::Error),

    #[error("Invalid record on line {line}: {source}")]
    InputLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("No input provided. Use --input <file> or pipe records via stdin.")]
    NoInput,

    #[error("No {role} field specified. Pass --{role}-field or set {role}_field in {}", .config_path.display())]
    MissingField {
        role: &'static str,
        config_path: PathBuf,
    },

    #[error("Source and target field must differ (both are \"{0}\")")]
    SameSourceAndTarget(String),

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Failed to serialize output: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
