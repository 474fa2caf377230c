//! Canonical size/position fit.

use gallery_types::{IndexedMesh, MeshBounds, MeshTopology, Point3};
use tracing::debug;

/// Upper edge of the target band for the largest bounding-box dimension.
///
/// The fit loop halves the mesh while the largest dimension is strictly
/// greater than this, so exactly 2.0 is accepted as converged.
pub const TARGET_MAX: f64 = 2.0;

/// Lower edge of the target band.
///
/// The fit loop doubles the mesh while the largest dimension is strictly
/// below this (and above [`NOISE_FLOOR`]), so exactly 1.0 is accepted as
/// converged.
pub const TARGET_MIN: f64 = 1.0;

/// Numerical noise floor. Dimensions at or below this are treated as
/// degenerate and left unscaled rather than doubled forever.
pub const NOISE_FLOOR: f64 = 1e-12;

/// Fixed scale applied after the fit so the mesh has a consistent
/// apparent size under the fixed-fov cameras.
pub const VIEW_SCALE: f64 = 2.5;

/// Translate and iteratively rescale a mesh into the canonical band,
/// then recenter it on the origin.
///
/// Steps:
/// 1. Translate so the bounding box's minimum corner sits at the origin.
/// 2. While the largest dimension exceeds [`TARGET_MAX`], halve all
///    coordinates; while it is below [`TARGET_MIN`] but above
///    [`NOISE_FLOOR`], double them. The boundaries are closed: exactly
///    1.0 and exactly 2.0 both terminate the loop.
/// 3. Translate so the bounding-box midpoint is at the origin on all
///    three axes.
///
/// Empty meshes are left untouched.
///
/// # Example
///
/// ```
/// use gallery_normalize::fit_to_band;
/// use gallery_types::{unit_cube, MeshBounds};
///
/// let mut mesh = unit_cube();
/// mesh.scale(100.0);
/// fit_to_band(&mut mesh);
///
/// let extent = mesh.bounds().max_extent();
/// assert!(extent > 1.0 && extent <= 2.0);
/// ```
pub fn fit_to_band(mesh: &mut IndexedMesh) {
    if mesh.is_empty() {
        return;
    }

    // Move the minimum corner to the origin.
    let min = mesh.bounds().min;
    mesh.translate(-min.coords);

    // Halve/double until the largest dimension lands in (1.0, 2.0].
    let mut steps = 0u32;
    loop {
        let largest = mesh.bounds().max_extent();

        if largest > TARGET_MAX {
            mesh.scale(0.5);
        } else if largest < TARGET_MIN && largest > NOISE_FLOOR {
            mesh.scale(2.0);
        } else {
            break;
        }
        steps += 1;
    }

    if steps > 0 {
        debug!(steps, "scaled mesh into canonical band");
    }

    // Recenter on the bounding-box midpoint.
    let center = mesh.bounds().center();
    mesh.translate(Point3::origin() - center);
}

/// Fit the mesh into the canonical band and apply the fixed view scale.
///
/// This is the complete geometric normalization used by the preview
/// pipeline. The mesh is mutated in place.
///
/// # Example
///
/// ```
/// use gallery_normalize::canonicalize;
/// use gallery_types::{unit_cube, MeshBounds};
///
/// let mut mesh = unit_cube();
/// canonicalize(&mut mesh);
///
/// // Centered, with the largest dimension in (2.5, 5.0]
/// let bounds = mesh.bounds();
/// assert!(bounds.center().coords.norm() < 1e-9);
/// assert!(bounds.max_extent() <= 5.0);
/// ```
pub fn canonicalize(mesh: &mut IndexedMesh) {
    fit_to_band(mesh);
    mesh.scale(VIEW_SCALE);
}
