//! Mesh file I/O for MeshGallery.
//!
//! This crate provides loading of triangle meshes in the two formats the
//! preview pipeline accepts:
//!
//! - **STL** (Stereolithography) - Binary and ASCII
//! - **OBJ** (Wavefront) - ASCII only
//!
//! Binary STL saving is also provided; the test suites use it to build
//! on-disk fixtures.
//!
//! # Example
//!
//! ```no_run
//! use gallery_io::load_mesh;
//!
//! // Format detected from the extension
//! let mesh = load_mesh("model.stl").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod obj;
mod stl;

pub use error::{IoError, IoResult};
pub use obj::load_obj;
pub use stl::{load_stl, save_stl};

use std::path::Path;

use gallery_types::IndexedMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// STL (Stereolithography) format.
    /// Supports binary and ASCII variants.
    Stl,
    /// OBJ (Wavefront) format.
    /// ASCII only, supports vertices and faces.
    Obj,
}

impl MeshFormat {
    /// Detect format from file extension (case-insensitive).
    ///
    /// # Returns
    ///
    /// The detected format, or `None` if the extension is not recognized.
    ///
    /// # Example
    ///
    /// ```
    /// use gallery_io::MeshFormat;
    ///
    /// assert_eq!(MeshFormat::from_path("model.STL"), Some(MeshFormat::Stl));
    /// assert_eq!(MeshFormat::from_path("model.txt"), None);
    /// ```
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            _ => None,
        }
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
        }
    }
}

/// Load a mesh from a file, detecting format from extension.
///
/// # Arguments
///
/// * `path` - Path to the mesh file
///
/// # Errors
///
/// Returns an error if:
/// - The file format cannot be determined from the extension
/// - The file cannot be read
/// - The file content is invalid for the detected format
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    match format {
        MeshFormat::Stl => load_stl(path),
        MeshFormat::Obj => load_obj(path),
    }
}
