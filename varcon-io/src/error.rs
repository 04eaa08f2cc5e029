use std::io;
use std::path::PathBuf;

use thiserror::Error;

use varcon_core::errors::VarconError;

/// Error type for varcon-io operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// IO error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The finished temporary file could not be renamed into place.
    #[error("Failed to publish {path}: {source}")]
    Publish { path: PathBuf, source: io::Error },

    #[error("Output path has no file name: {0}")]
    InvalidPath(PathBuf),

    #[error("Unknown output format '{0}', expected one of tsv, json, yaml")]
    UnknownFormat(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for varcon-io operations.
pub type Result<T> = std::result::Result<T, IoError>;

impl From<IoError> for VarconError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => VarconError::Io(e),
            IoError::Publish { path, source } => VarconError::Publish { path, source },
            IoError::InvalidPath(path) => VarconError::InvalidConfig(format!(
                "output path has no file name: {}",
                path.display()
            )),
            IoError::UnknownFormat(f) => VarconError::InvalidConfig(format!(
                "unknown output format '{}', expected one of tsv, json, yaml",
                f
            )),
            IoError::Json(e) => VarconError::Serialization(e.to_string()),
            IoError::Yaml(e) => VarconError::Serialization(e.to_string()),
        }
    }
}
