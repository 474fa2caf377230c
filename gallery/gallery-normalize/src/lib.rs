//! Canonical mesh normalization for MeshGallery.
//!
//! Before rendering, every mesh is brought into the same size and
//! position regime so the two fixed preview cameras frame it
//! consistently, regardless of the units or placement of the input file:
//!
//! 1. [`fit_to_band`] translates the mesh's minimum corner to the origin,
//!    then repeatedly halves or doubles all coordinates until the largest
//!    bounding-box dimension lies in `(1.0, 2.0]`, and finally recenters
//!    the mesh on its bounding-box midpoint.
//! 2. [`canonicalize`] runs the fit and applies the fixed view scale
//!    (×2.5) expected by the camera distance.
//! 3. [`repair_winding`] makes lighting physically sensible when the
//!    input's triangle winding is inconsistent (best-effort, never
//!    fails).
//! 4. [`apply_preview_tint`] assigns the uniform preview color.
//!
//! The halve/double loop deliberately avoids a single division, which
//! could produce a degenerate scale for extreme aspect ratios; it
//! converges in O(log(size)) steps.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod fit;
mod winding;

pub use fit::{canonicalize, fit_to_band, NOISE_FLOOR, TARGET_MAX, TARGET_MIN, VIEW_SCALE};
pub use winding::{compute_vertex_normals, is_winding_consistent, repair_winding};

use gallery_types::{IndexedMesh, VertexColor};

/// The uniform RGBA tint applied to every vertex before rendering.
pub const PREVIEW_TINT: VertexColor = VertexColor::with_alpha(200, 150, 100, 255);

/// Assign the uniform preview tint to all vertices.
///
/// Kept as a separate step (rather than folded into [`canonicalize`])
/// because tinting is non-fatal by contract: a representation that
/// cannot carry vertex colors would log and continue.
///
/// # Example
///
/// ```
/// use gallery_normalize::{apply_preview_tint, PREVIEW_TINT};
/// use gallery_types::unit_cube;
///
/// let mut mesh = unit_cube();
/// apply_preview_tint(&mut mesh);
/// assert!(mesh.vertices.iter().all(|v| v.color() == Some(PREVIEW_TINT)));
/// ```
pub fn apply_preview_tint(mesh: &mut IndexedMesh) {
    mesh.set_uniform_color(PREVIEW_TINT);
}
