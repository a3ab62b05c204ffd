//! Error types for reading and writing point data.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing point files and artifacts.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// NumPy array could not be read
    #[error("NPY read error: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    /// NumPy array could not be written
    #[error("NPY write error: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    /// Array does not hold one `(plane, x, y)` row per point
    #[error("Invalid array shape {shape:?} in {path:?}: expected (n, 3)")]
    InvalidShape {
        /// File the array came from
        path: PathBuf,
        /// Shape that was found
        shape: Vec<usize>,
    },
}

impl FormatError {
    /// Create an invalid shape error.
    pub fn invalid_shape(path: impl Into<PathBuf>, shape: &[usize]) -> Self {
        Self::InvalidShape {
            path: path.into(),
            shape: shape.to_vec(),
        }
    }
}
