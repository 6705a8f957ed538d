use std::path::PathBuf;
use thiserror::Error;

use super::format::FormatError;
use crate::binder::BindError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("required document not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read document '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write document '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to copy default resource '{resource}' to '{path}': {source}")]
    ResourceError {
        resource: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse document '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: FormatError,
    },

    #[error("failed to serialize document '{path}': {source}")]
    SerializeError {
        path: PathBuf,
        source: FormatError,
    },

    #[error("no document format for '{0}'")]
    UnknownFormat(PathBuf),

    #[error(transparent)]
    Bind(#[from] BindError),
}
