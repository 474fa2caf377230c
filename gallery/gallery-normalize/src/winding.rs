//! Winding consistency check and best-effort repair.

use gallery_types::{IndexedMesh, MeshTopology, Vector3};
use hashbrown::HashMap;
use tracing::{debug, warn};

/// Check whether triangle winding is consistent across the mesh.
///
/// In a consistently wound mesh every interior edge is traversed once in
/// each direction by its two adjacent faces. An edge traversed twice in
/// the same direction means the two faces disagree about which side is
/// "outside". Boundary edges (used by a single face) do not count
/// against consistency.
///
/// # Example
///
/// ```
/// use gallery_normalize::is_winding_consistent;
/// use gallery_types::unit_cube;
///
/// assert!(is_winding_consistent(&unit_cube()));
///
/// let mut broken = unit_cube();
/// broken.faces[0].swap(1, 2); // flip one face
/// assert!(!is_winding_consistent(&broken));
/// ```
#[must_use]
pub fn is_winding_consistent(mesh: &IndexedMesh) -> bool {
    // Count directed edge uses; a repeat of the same direction is a
    // winding conflict.
    let mut directed: HashMap<(u32, u32), u32> = HashMap::with_capacity(mesh.faces.len() * 3);

    for &[i0, i1, i2] in &mesh.faces {
        for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
            *directed.entry((a, b)).or_insert(0) += 1;
        }
    }

    // Two faces traversing an edge in the same direction disagree about
    // which side is outside.
    directed.values().all(|&count| count <= 1)
}

/// Best-effort winding repair.
///
/// If the winding is already consistent this is a no-op. Otherwise the
/// mesh is flipped globally when it appears inside-out (negative signed
/// volume) and vertex normals are recomputed so lighting stays sensible.
/// Failure to produce a perfect orientation is not an error; rendering
/// proceeds with whatever this leaves behind.
pub fn repair_winding(mesh: &mut IndexedMesh) {
    if mesh.is_empty() || is_winding_consistent(mesh) {
        return;
    }

    debug!(
        faces = mesh.faces.len(),
        "inconsistent winding, attempting repair"
    );

    if mesh.is_inside_out() {
        mesh.flip_normals();
    }

    compute_vertex_normals(mesh);

    if !is_winding_consistent(mesh) {
        // Local conflicts survive a global flip; previews tolerate this.
        warn!("winding still inconsistent after repair, rendering as-is");
    }
}

/// Recompute vertex normals as the area-weighted average of adjacent
/// face normals.
///
/// Degenerate faces contribute nothing. Vertices with no valid adjacent
/// face keep no normal.
pub fn compute_vertex_normals(mesh: &mut IndexedMesh) {
    let mut sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); mesh.vertices.len()];

    for (face, tri) in mesh.faces.iter().copied().zip(mesh.triangles()) {
        // Cross product magnitude is proportional to area, so summing the
        // unnormalized cross vectors gives the area weighting for free.
        let weighted = tri.edge_cross();
        for index in face {
            sums[index as usize] += weighted;
        }
    }

    for (vertex, sum) in mesh.vertices.iter_mut().zip(sums) {
        let norm = sum.norm();
        vertex.attributes.normal = if norm > f64::EPSILON {
            Some(sum / norm)
        } else {
            None
        };
    }
}
