//! Error types for batch processing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that fail a single mesh task.
///
/// A task error never stops the batch: the worker reports it and the
/// scheduler counts the task as failed while the rest of the queue
/// keeps draining.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The input file could not be read or parsed.
    #[error("failed to load {path}: {source}")]
    Load {
        /// Path of the mesh file.
        path: PathBuf,
        /// The underlying I/O or parse error.
        #[source]
        source: gallery_io::IoError,
    },

    /// The file parsed but contains no vertices or faces.
    #[error("empty mesh: {path}")]
    EmptyMesh {
        /// Path of the mesh file.
        path: PathBuf,
    },
}

/// Errors that abort the whole batch before any worker runs.
#[derive(Debug, Error)]
pub enum BatchError {
    /// No root directory argument was given.
    #[error("missing root directory argument")]
    MissingRoot,

    /// The given root is not an existing directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The path of the running executable could not be determined, so
    /// workers cannot be spawned.
    #[error("failed to locate worker executable: {0}")]
    WorkerExecutable(#[from] std::io::Error),
}
