//! Error types for offscreen rendering.

use thiserror::Error;

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while producing a preview image.
///
/// All of these are recoverable per view: the batch logs a warning for
/// the affected output path and moves on.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The mesh has no vertices or no faces.
    #[error("mesh has no renderable geometry")]
    NoGeometry,

    /// PNG encoding or decoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Writing or re-reading the output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
