use std::path::PathBuf;

use thiserror::Error;

/// Stage-level failures shared by every varcon crate.
///
/// Row-level outcomes (a key missing on one side of the join, an ambiguous key,
/// an unparseable classification string) are not errors and never show up here.
#[derive(Error, Debug)]
pub enum VarconError {
    #[error("Schema mismatch in {stage}: required field '{field}' not found in {input}")]
    SchemaMismatch {
        stage: &'static str,
        field: String,
        input: String,
    },

    #[error("Field '{0}' is declared by both join inputs")]
    FieldCollision(String),

    #[error("Malformed row at {input}:{line}: {reason}")]
    MalformedRow {
        input: String,
        line: usize,
        reason: String,
    },

    #[error("No header found, input is empty: {0}")]
    EmptyInput(String),

    #[error("Invalid variant key: {0}")]
    InvalidKey(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to publish {path}: {source}")]
    Publish {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VarconError>;
